//! The synchronization engine.
//!
//! Orchestrates the full life of a network-backed operation: validate,
//! resolve the URL, build the payload from dirty attributes, send, parse
//! the envelope through the mapping table and expander, and reconcile
//! local state. Each operation runs to completion synchronously except at
//! the transport call.
//!
//! Operations take `&mut Resource<K>`, so overlapping operations on one
//! instance cannot be expressed; sequencing across instances is the
//! caller's responsibility.


use std::sync::Arc;

use reviewkit_types::{Envelope, ResourceError, Result};
use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::expand::apply_payload;
use crate::resource::{Resource, ResourceKind};
use crate::transport::{ApiRequest, Method, Transport};

/// Options for a save operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Send every serializable attribute instead of only the dirty ones.
    pub full: bool,
}

/// The fetch/save/destroy orchestrator.
pub struct SyncEngine {
    transport: Arc<dyn Transport>,
}

impl SyncEngine {
    /// Create an engine over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the resource's server representation.
    ///
    /// No validation is required. On success the mapping table and the
    /// expander are applied, `loaded` is set, and the dirty set is cleared.
    pub async fn fetch<K: ResourceKind>(&self, resource: &mut Resource<K>) -> Result<()> {
        let url = resource.url()?;
        tracing::debug!(kind = K::NAME, %url, "fetching resource");

        let response = self
            .transport
            .send(ApiRequest {
                method: Method::Get,
                url,
                body: None,
            })
            .await?;

        let payload =
            Envelope::parse(response.body)?.into_payload(K::schema().rsp_namespace)?;

        let entity = resource.entity_mut();
        apply_payload(entity, &payload)?;
        entity.mark_loaded();
        entity.clear_dirty();

        tracing::debug!(kind = K::NAME, id = ?resource.id(), "resource fetched");
        Ok(())
    }

    /// Save the resource: POST when new, PUT once persisted.
    ///
    /// The validation chain runs first; a violation rejects the operation
    /// before any request is built. The payload contains the serializable
    /// dirty attributes (all serializable attributes when
    /// `SaveOptions::full` is set). On success, dirty flags are cleared
    /// only for the attributes actually sent; on failure the dirty set is
    /// left untouched so a retry resends the same payload.
    pub async fn save<K: ResourceKind>(
        &self,
        resource: &mut Resource<K>,
        options: SaveOptions,
    ) -> Result<()> {
        if let Some(message) = resource.validate() {
            tracing::debug!(kind = K::NAME, %message, "save rejected by validation");
            return Err(ResourceError::Validation(message));
        }

        let (body, included) = build_payload(resource.entity(), options.full)?;

        let (method, url) = if resource.is_new() {
            (Method::Post, K::collection_url(&resource.entity().view())?)
        } else {
            (Method::Put, resource.url()?)
        };
        tracing::debug!(
            kind = K::NAME,
            method = method.as_str(),
            %url,
            attrs = included.len(),
            "saving resource"
        );

        let response = self
            .transport
            .send(ApiRequest {
                method,
                url,
                body: Some(Value::Object(body)),
            })
            .await?;

        let payload =
            Envelope::parse(response.body)?.into_payload(K::schema().rsp_namespace)?;

        let entity = resource.entity_mut();
        apply_payload(entity, &payload)?;
        entity.mark_loaded();
        entity.clear_dirty_for(&included);

        tracing::debug!(kind = K::NAME, id = ?resource.id(), "resource saved");
        Ok(())
    }

    /// Destroy the resource.
    ///
    /// A resource that has never been persisted is destroyed locally
    /// without a network call. Otherwise a DELETE is issued; on success the
    /// local identity is cleared and the resource is new again.
    pub async fn destroy<K: ResourceKind>(&self, resource: &mut Resource<K>) -> Result<()> {
        if resource.is_new() {
            tracing::debug!(kind = K::NAME, "destroying unsaved resource locally");
            resource.entity_mut().reset_identity();
            return Ok(());
        }

        let url = resource.url()?;
        tracing::debug!(kind = K::NAME, %url, "destroying resource");

        let response = self
            .transport
            .send(ApiRequest {
                method: Method::Delete,
                url,
                body: None,
            })
            .await?;

        // Deletes usually come back bodiless; when a JSON envelope does
        // arrive, honor its status.
        if response.body.is_object() {
            Envelope::parse(response.body)?.ensure_ok()?;
        }

        resource.entity_mut().reset_identity();
        tracing::debug!(kind = K::NAME, "resource destroyed");
        Ok(())
    }
}

/// Build an outbound payload from the serializable attributes.
///
/// Returns the JSON body and the attribute names included in it. An
/// attribute is included when it is serializable, present, and either
/// dirty or `full` was requested; a custom serializer may still omit its
/// field by returning `None`.
pub(crate) fn build_payload(
    entity: &Entity,
    full: bool,
) -> Result<(Map<String, Value>, Vec<&'static str>)> {
    let view = entity.view();
    let mut body = Map::new();
    let mut included = Vec::new();

    for field in entity.schema().fields {
        if !field.serialize {
            continue;
        }
        if !full && !entity.is_dirty(field.attr) {
            continue;
        }
        let Some(value) = entity.get(field.attr) else {
            continue;
        };

        let wire = match field.serializer {
            Some(serializer) => serializer(value, &view)?,
            None => Some(value.to_json()),
        };

        if let Some(wire) = wire {
            body.insert(field.json_key.to_string(), wire);
            included.push(field.attr);
        }
    }

    Ok((body, included))
}
