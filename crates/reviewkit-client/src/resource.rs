//! The `ResourceKind` trait and the typed `Resource<K>` handle.

use std::marker::PhantomData;

use reviewkit_types::{AttrValue, ResourceId, Result};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::entity::{AttrChange, AttrView, Entity, ParentLink};
use crate::validation::{run_chain, ValidationRule};

/// A resource kind: the static description of one entity type.
///
/// Kinds are configuration, not behavior: a mapping table, an ordered
/// validation chain (base rules first), and a collection-URL resolver. The
/// synchronization engine is generic over this trait.
pub trait ResourceKind: 'static {
    /// Kind name used in logging.
    const NAME: &'static str;

    /// The attribute mapping table.
    fn schema() -> &'static crate::schema::Schema;

    /// The validation chain, checked in order before every save.
    fn validators() -> &'static [ValidationRule] {
        &[]
    }

    /// The collection URL for this kind, computed from attributes alone.
    ///
    /// Must be deterministic and perform no I/O. Missing hierarchy
    /// attributes are an error, never a silently unusable URL.
    fn collection_url(attrs: &AttrView<'_>) -> Result<String>;
}

/// A typed handle over one entity of kind `K`.
pub struct Resource<K: ResourceKind> {
    entity: Entity,
    _kind: PhantomData<K>,
}

impl<K: ResourceKind> Resource<K> {
    /// Create a new, unsaved resource with default attributes.
    pub fn new() -> Self {
        Self {
            entity: Entity::new(K::schema()),
            _kind: PhantomData,
        }
    }

    /// The underlying entity.
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub(crate) fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    /// The server identity, if persisted.
    pub fn id(&self) -> Option<ResourceId> {
        self.entity.id()
    }

    /// True while the resource has never been persisted.
    pub fn is_new(&self) -> bool {
        self.entity.is_new()
    }

    /// Whether the full server representation has been fetched.
    pub fn loaded(&self) -> bool {
        self.entity.loaded()
    }

    /// Read an attribute.
    pub fn get(&self, attr: &str) -> Option<&AttrValue> {
        self.entity.get(attr)
    }

    /// Set an attribute, marking it dirty if the value changed.
    pub fn set(&mut self, attr: &str, value: impl Into<AttrValue>) -> Result<()> {
        self.entity.set(attr, value)
    }

    /// Link this resource to its parent object.
    pub fn set_parent(&mut self, parent: ParentLink) {
        self.entity.set_parent(parent);
    }

    /// An expanded child entity, if the last parse contained it.
    pub fn child(&self, attr: &str) -> Option<&Entity> {
        self.entity.child(attr)
    }

    /// The preserved `extra_data` object, for kinds that opt in.
    pub fn extra_data(&self) -> Option<&Map<String, Value>> {
        self.entity.extra_data()
    }

    /// Subscribe to attribute-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AttrChange> {
        self.entity.subscribe()
    }

    /// The resource's network address.
    ///
    /// The collection URL while new; collection URL plus identity segment
    /// once persisted.
    pub fn url(&self) -> Result<String> {
        let collection = K::collection_url(&self.entity.view())?;
        Ok(match self.entity.id() {
            Some(id) => format!("{collection}{id}/"),
            None => collection,
        })
    }

    /// Validate the current attributes, returning the first violation.
    pub fn validate(&self) -> Option<String> {
        run_chain(K::validators(), &self.entity.view())
    }
}

impl<K: ResourceKind> Default for Resource<K> {
    fn default() -> Self {
        Self::new()
    }
}
