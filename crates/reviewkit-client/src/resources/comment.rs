//! Behavior shared by comment-like resource kinds.
//!
//! Comments of every flavor carry the same text-type handling, issue
//! tracking states, and parent-object requirements. The per-kind tables in
//! sibling modules pull their field transforms and base validation rules
//! from here, listed ahead of their own rules.

use reviewkit_types::{AttrValue, Result};
use serde_json::{Map, Value};

use crate::entity::AttrView;

/// Issue state: open and awaiting action.
pub const STATE_OPEN: &str = "open";
/// Issue state: resolved.
pub const STATE_RESOLVED: &str = "resolved";
/// Issue state: dropped.
pub const STATE_DROPPED: &str = "dropped";
/// Issue state: marked resolved, awaiting verification.
pub const STATE_VERIFYING_RESOLVED: &str = "verifying-resolved";
/// Issue state: marked dropped, awaiting verification.
pub const STATE_VERIFYING_DROPPED: &str = "verifying-dropped";

/// Violation message when a comment has no parent object.
pub const PARENT_REQUIRED: &str = "A comment must have a parent object";
/// Violation message when a comment's parent is not published.
pub const PARENT_NOT_PUBLIC: &str = "The comment's parent object must be published";

/// Base rule: the parent object link must be set.
pub fn parent_object_set(view: &AttrView<'_>) -> Option<String> {
    if view.parent().is_none() {
        Some(PARENT_REQUIRED.to_string())
    } else {
        None
    }
}

/// Base rule: the parent object must be published.
pub fn parent_object_public(view: &AttrView<'_>) -> Option<String> {
    match view.parent() {
        Some(parent) if !parent.public => Some(PARENT_NOT_PUBLIC.to_string()),
        _ => None,
    }
}

/// Serialize the `richText` flag as the wire `text_type`, honoring a
/// `forceTextType` override.
pub fn rich_text_to_wire(value: &AttrValue, view: &AttrView<'_>) -> Result<Option<Value>> {
    let text_type = match view.str("forceTextType") {
        Some(forced) => forced,
        None if value.as_bool().unwrap_or(false) => "markdown",
        None => "plain",
    };
    Ok(Some(Value::String(text_type.to_string())))
}

/// Deserialize the wire `text_type` into the `richText` flag.
pub fn rich_text_from_wire(value: &Value, _payload: &Map<String, Value>) -> Result<AttrValue> {
    Ok(AttrValue::Bool(value.as_str() == Some("markdown")))
}

/// Serialize a value as-is, omitting the field entirely when unset.
pub fn skip_when_null(value: &AttrValue, _view: &AttrView<'_>) -> Result<Option<Value>> {
    if value.is_null() {
        Ok(None)
    } else {
        Ok(Some(value.to_json()))
    }
}

/// Serialize a parent-linkage id, sent only while the comment has not been
/// loaded from the server (the server already knows it afterwards).
pub fn id_unless_loaded(value: &AttrValue, view: &AttrView<'_>) -> Result<Option<Value>> {
    if view.is_loaded() || value.is_null() {
        Ok(None)
    } else {
        Ok(Some(value.to_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, ParentLink};
    use crate::schema::{field, Schema};

    static SCHEMA: Schema = Schema {
        rsp_namespace: "comment",
        fields: &[field("text").read_write()],
        expansions: &[],
        track_extra_data: false,
    };

    #[test]
    fn test_parent_rules() {
        let mut entity = Entity::new(&SCHEMA);
        assert_eq!(
            parent_object_set(&entity.view()),
            Some(PARENT_REQUIRED.to_string())
        );

        entity.set_parent(ParentLink {
            id: Some(reviewkit_types::ResourceId::new(1)),
            public: false,
        });
        assert_eq!(parent_object_set(&entity.view()), None);
        assert_eq!(
            parent_object_public(&entity.view()),
            Some(PARENT_NOT_PUBLIC.to_string())
        );

        entity.set_parent(ParentLink {
            id: Some(reviewkit_types::ResourceId::new(1)),
            public: true,
        });
        assert_eq!(parent_object_public(&entity.view()), None);
    }

    #[test]
    fn test_rich_text_round_trip() {
        let entity = Entity::new(&SCHEMA);
        let view = entity.view();

        let wire = rich_text_to_wire(&AttrValue::Bool(true), &view).unwrap();
        assert_eq!(wire, Some(Value::String("markdown".to_string())));

        let wire = rich_text_to_wire(&AttrValue::Bool(false), &view).unwrap();
        assert_eq!(wire, Some(Value::String("plain".to_string())));

        let parsed =
            rich_text_from_wire(&Value::String("markdown".to_string()), &Map::new()).unwrap();
        assert_eq!(parsed, AttrValue::Bool(true));
    }
}
