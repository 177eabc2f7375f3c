//! Declarative attribute mapping tables.
//!
//! A `Schema` is the single source of truth for how a resource kind's
//! attributes correspond to its JSON wire format: field names, direction
//! (outbound, inbound, both, or neither), defaults, custom per-field
//! (de)serialization, and the embedded objects that expand into child
//! entities. Schemas are plain `'static` data with pure function pointers,
//! so they can be inspected and tested in isolation from any entity.

use reviewkit_types::{AttrValue, Result};
use serde_json::{Map, Value};

use crate::entity::AttrView;

/// Serializes one attribute to its wire value.
///
/// Receives a read-only view of the sibling attributes so that derived wire
/// fields (a line count computed from a line range) and conditional fields
/// (ids sent only while the entity is unloaded) stay pure functions.
/// Returning `Ok(None)` omits the field from the payload.
pub type Serializer = fn(&AttrValue, &AttrView<'_>) -> Result<Option<Value>>;

/// Deserializes one attribute from its wire value.
///
/// Receives the whole payload object for context, so an attribute may be
/// derived from more than one wire field.
pub type Deserializer = fn(&Value, &Map<String, Value>) -> Result<AttrValue>;

/// How a single attribute maps to the wire format.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    /// The attribute name.
    pub attr: &'static str,
    /// The JSON field name. Defaults to the attribute name.
    pub json_key: &'static str,
    /// Whether the attribute is eligible for outbound payloads.
    pub serialize: bool,
    /// Whether the attribute may be populated from a response.
    pub deserialize: bool,
    /// Custom outbound transform.
    pub serializer: Option<Serializer>,
    /// Custom inbound transform.
    pub deserializer: Option<Deserializer>,
    /// Initial value for new entities. Must be pure.
    pub default: Option<fn() -> AttrValue>,
}

/// Start a field definition. The JSON key defaults to the attribute name
/// and the field maps in neither direction until marked.
pub const fn field(attr: &'static str) -> FieldSpec {
    FieldSpec {
        attr,
        json_key: attr,
        serialize: false,
        deserialize: false,
        serializer: None,
        deserializer: None,
        default: None,
    }
}

impl FieldSpec {
    /// Map to a JSON field name other than the attribute name.
    pub const fn json(mut self, key: &'static str) -> Self {
        self.json_key = key;
        self
    }

    /// Eligible for inbound population from responses.
    pub const fn readable(mut self) -> Self {
        self.deserialize = true;
        self
    }

    /// Eligible for outbound payloads.
    pub const fn writable(mut self) -> Self {
        self.serialize = true;
        self
    }

    /// Shorthand for `.readable().writable()`.
    pub const fn read_write(self) -> Self {
        self.readable().writable()
    }

    /// Initial value for new entities.
    pub const fn with_default(mut self, default: fn() -> AttrValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Custom outbound transform. Implies `writable`.
    pub const fn serialize_with(mut self, serializer: Serializer) -> Self {
        self.serialize = true;
        self.serializer = Some(serializer);
        self
    }

    /// Custom inbound transform. Implies `readable`.
    pub const fn deserialize_with(mut self, deserializer: Deserializer) -> Self {
        self.deserialize = true;
        self.deserializer = Some(deserializer);
        self
    }
}

/// One embedded-object expansion: a JSON key that, when present in a
/// response, materializes as a child entity under `attr`.
#[derive(Clone, Copy, Debug)]
pub struct Expansion {
    /// The embedded object's key in the payload.
    pub json_key: &'static str,
    /// The parent attribute the child is attached under.
    pub attr: &'static str,
    /// The child kind's mapping table.
    pub child: &'static Schema,
}

/// The full declarative description of a resource kind's wire mapping.
#[derive(Debug)]
pub struct Schema {
    /// The key under which this kind's payload nests inside an envelope.
    pub rsp_namespace: &'static str,
    /// Attribute field specs, in serialization order.
    pub fields: &'static [FieldSpec],
    /// Embedded objects that expand into child entities.
    pub expansions: &'static [Expansion],
    /// Opt-in passthrough of the server's `extra_data` object. When false,
    /// unrecognized response fields are silently discarded.
    pub track_extra_data: bool,
}

impl Schema {
    /// Look up the field spec for an attribute name.
    pub fn field(&self, attr: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.attr == attr)
    }

    /// Whether `attr` names a declared attribute of this kind.
    pub fn has_attr(&self, attr: &str) -> bool {
        self.field(attr).is_some()
    }

    /// Whether `attr` names a declared expansion target.
    pub fn has_expansion_attr(&self, attr: &str) -> bool {
        self.expansions.iter().any(|e| e.attr == attr)
    }

    /// Check structural invariants: attribute names and JSON keys must each
    /// be unique within the table, and expansion targets must not collide
    /// with field attributes.
    ///
    /// Returns the first violation found, if any.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        for (i, a) in self.fields.iter().enumerate() {
            for b in &self.fields[i + 1..] {
                if a.attr == b.attr {
                    return Err(format!("duplicate attribute {:?}", a.attr));
                }
                if a.json_key == b.json_key {
                    return Err(format!(
                        "attributes {:?} and {:?} both map to JSON key {:?}",
                        a.attr, b.attr, a.json_key
                    ));
                }
            }
        }

        for (i, a) in self.expansions.iter().enumerate() {
            for b in &self.expansions[i + 1..] {
                if a.attr == b.attr || a.json_key == b.json_key {
                    return Err(format!("duplicate expansion {:?}", a.attr));
                }
            }
            if self.has_attr(a.attr) {
                return Err(format!(
                    "expansion target {:?} collides with a field attribute",
                    a.attr
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GOOD: Schema = Schema {
        rsp_namespace: "thing",
        fields: &[
            field("name").read_write(),
            field("displayName").json("display_name").readable(),
        ],
        expansions: &[],
        track_extra_data: false,
    };

    static CLASHING_KEYS: Schema = Schema {
        rsp_namespace: "thing",
        fields: &[
            field("name").readable(),
            field("displayName").json("name").readable(),
        ],
        expansions: &[],
        track_extra_data: false,
    };

    #[test]
    fn test_field_lookup() {
        assert!(GOOD.has_attr("name"));
        assert!(!GOOD.has_attr("missing"));
        assert_eq!(GOOD.field("displayName").unwrap().json_key, "display_name");
    }

    #[test]
    fn test_invariants_pass() {
        assert!(GOOD.check_invariants().is_ok());
    }

    #[test]
    fn test_duplicate_json_key_rejected() {
        let err = CLASHING_KEYS.check_invariants().unwrap_err();
        assert!(err.contains("name"));
    }

    #[test]
    fn test_json_key_defaults_to_attr_name() {
        let spec = field("note").read_write();
        assert_eq!(spec.json_key, "note");
        assert!(spec.serialize);
        assert!(spec.deserialize);
    }
}
