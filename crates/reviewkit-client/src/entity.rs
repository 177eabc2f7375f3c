//! Entity state and dirty-attribute tracking.
//!
//! An `Entity` is one addressable domain object: a schema-validated
//! attribute map, a server identity (absent until first persisted), the
//! dirty set driving partial saves, expanded child entities, and a
//! broadcast channel carrying attribute-change notifications to observers.

use std::collections::{BTreeMap, BTreeSet};

use reviewkit_types::{AttrValue, ResourceError, ResourceId, Result};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::schema::Schema;

/// Capacity of the attribute-change broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// An attribute-change notification.
///
/// Emitted on every successful attribute mutation, whether from a local
/// setter or from a parsed server response.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrChange {
    /// The attribute that changed.
    pub attr: &'static str,
    /// Its new value.
    pub value: AttrValue,
}

/// A reference to a comment-like entity's parent object.
///
/// Parents are referenced, never duplicated: the link carries just the
/// parent's identity and published state, which is all the validation
/// chain needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentLink {
    /// The parent's server identity, if persisted.
    pub id: Option<ResourceId>,
    /// Whether the parent has been published.
    pub public: bool,
}

/// A single client-side entity synchronized with a server resource.
#[derive(Debug)]
pub struct Entity {
    schema: &'static Schema,
    id: Option<ResourceId>,
    attrs: BTreeMap<&'static str, AttrValue>,
    dirty: BTreeSet<&'static str>,
    loaded: bool,
    parent: Option<ParentLink>,
    extra_data: Option<Map<String, Value>>,
    children: BTreeMap<&'static str, Entity>,
    events: broadcast::Sender<AttrChange>,
}

impl Entity {
    /// Create a new, unsaved entity with the schema's default attributes.
    pub fn new(schema: &'static Schema) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut attrs = BTreeMap::new();

        for field in schema.fields {
            if let Some(default) = field.default {
                attrs.insert(field.attr, default());
            }
        }

        Self {
            schema,
            id: None,
            attrs,
            dirty: BTreeSet::new(),
            loaded: false,
            parent: None,
            extra_data: None,
            children: BTreeMap::new(),
            events,
        }
    }

    /// The entity's mapping table.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// The server identity, if persisted.
    pub fn id(&self) -> Option<ResourceId> {
        self.id
    }

    /// True while the entity has never been persisted.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Whether the full server representation has been fetched.
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Read an attribute. Absent attributes return `None`.
    pub fn get(&self, attr: &str) -> Option<&AttrValue> {
        self.attrs.get(attr)
    }

    /// Set an attribute, marking it dirty if the value changed.
    ///
    /// The attribute name must be declared in the schema; unknown names are
    /// rejected so the per-kind key set stays closed.
    pub fn set(&mut self, attr: &str, value: impl Into<AttrValue>) -> Result<()> {
        let Some(spec) = self.schema.field(attr) else {
            return Err(ResourceError::Validation(format!(
                "unknown attribute {attr:?} for resource kind {:?}",
                self.schema.rsp_namespace
            )));
        };

        let attr = spec.attr;
        let value = value.into();

        if self.attrs.get(attr) == Some(&value) {
            return Ok(());
        }

        self.attrs.insert(attr, value.clone());
        self.dirty.insert(attr);
        self.emit(attr, value);
        Ok(())
    }

    /// Whether an attribute has changed since the last successful sync.
    pub fn is_dirty(&self, attr: &str) -> bool {
        self.dirty.contains(attr)
    }

    /// The attributes changed since the last successful sync.
    pub fn dirty_attrs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dirty.iter().copied()
    }

    /// The parent-object link, if set.
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Link this entity to its parent object.
    pub fn set_parent(&mut self, parent: ParentLink) {
        self.parent = Some(parent);
    }

    /// An expanded child entity, if the last parse contained it.
    pub fn child(&self, attr: &str) -> Option<&Entity> {
        self.children.get(attr)
    }

    /// The preserved `extra_data` object, for kinds that opt in.
    pub fn extra_data(&self) -> Option<&Map<String, Value>> {
        self.extra_data.as_ref()
    }

    /// Subscribe to attribute-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AttrChange> {
        self.events.subscribe()
    }

    /// A read-only view of the current attributes.
    pub fn view(&self) -> AttrView<'_> {
        AttrView {
            attrs: &self.attrs,
            loaded: self.loaded,
            parent: self.parent.as_ref(),
        }
    }

    /// Apply an attribute from a parsed response: no dirty marking, but
    /// observers are still notified.
    pub(crate) fn apply(&mut self, attr: &'static str, value: AttrValue) {
        if self.attrs.get(attr) == Some(&value) {
            return;
        }
        self.attrs.insert(attr, value.clone());
        self.emit(attr, value);
    }

    pub(crate) fn set_id(&mut self, id: ResourceId) {
        self.id = Some(id);
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Clear dirty flags only for the attributes actually sent.
    pub(crate) fn clear_dirty_for(&mut self, attrs: &[&'static str]) {
        for attr in attrs {
            self.dirty.remove(attr);
        }
    }

    /// Forget the server identity after a destroy: the entity is new again.
    pub(crate) fn reset_identity(&mut self) {
        self.id = None;
        self.loaded = false;
        self.dirty.clear();
    }

    pub(crate) fn set_extra_data(&mut self, data: Map<String, Value>) {
        self.extra_data = Some(data);
    }

    pub(crate) fn child_mut(&mut self, attr: &str) -> Option<&mut Entity> {
        self.children.get_mut(attr)
    }

    pub(crate) fn attach_child(&mut self, attr: &'static str, child: Entity) {
        self.children.insert(attr, child);
    }

    fn emit(&self, attr: &'static str, value: AttrValue) {
        // Nobody listening is fine.
        let _ = self.events.send(AttrChange { attr, value });
    }
}

/// A read-only view of an entity's attributes.
///
/// Serializers, validators, and URL resolvers all take this instead of the
/// entity itself, keeping them pure over attribute data.
#[derive(Debug, Clone, Copy)]
pub struct AttrView<'a> {
    attrs: &'a BTreeMap<&'static str, AttrValue>,
    loaded: bool,
    parent: Option<&'a ParentLink>,
}

impl<'a> AttrView<'a> {
    /// Read an attribute.
    pub fn get(&self, attr: &str) -> Option<&'a AttrValue> {
        self.attrs.get(attr)
    }

    /// The attribute as an integer, if present and integral.
    pub fn int(&self, attr: &str) -> Option<i64> {
        self.get(attr).and_then(AttrValue::as_int)
    }

    /// The attribute as a string, if present and textual.
    pub fn str(&self, attr: &str) -> Option<&'a str> {
        self.get(attr).and_then(AttrValue::as_str)
    }

    /// The attribute as a bool, if present and boolean.
    pub fn bool(&self, attr: &str) -> Option<bool> {
        self.get(attr).and_then(AttrValue::as_bool)
    }

    /// Whether the underlying entity has been fully fetched.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The underlying entity's parent link, if any.
    pub fn parent(&self) -> Option<&'a ParentLink> {
        self.parent
    }
}
