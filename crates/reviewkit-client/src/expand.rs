//! Response application and nested resource expansion.
//!
//! Applies a parsed payload object to an entity through its mapping table,
//! then walks the schema's expansion entries, turning embedded JSON objects
//! into first-class child entities. No network calls happen here.

use reviewkit_types::{AttrValue, ResourceError, ResourceId, Result};
use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::schema::Expansion;

/// Apply a payload object to an entity.
///
/// Only attributes listed as deserializable are touched; fields absent from
/// the payload are left alone, never nulled. Embedded objects named by the
/// schema's expansions become child entities; absent embedded keys leave
/// the corresponding child absent.
pub fn apply_payload(entity: &mut Entity, payload: &Map<String, Value>) -> Result<()> {
    if let Some(raw) = payload.get("id") {
        let id = raw.as_i64().ok_or_else(|| {
            ResourceError::Deserialization(format!("id is not an integer: {raw}"))
        })?;
        entity.set_id(ResourceId::new(id));
    }

    let schema = entity.schema();

    for field in schema.fields {
        if !field.deserialize {
            continue;
        }
        let Some(raw) = payload.get(field.json_key) else {
            continue;
        };
        let value = match field.deserializer {
            Some(deserializer) => deserializer(raw, payload)?,
            None => AttrValue::from_json(raw)?,
        };
        entity.apply(field.attr, value);
    }

    for expansion in schema.expansions {
        if let Some(embedded) = payload.get(expansion.json_key) {
            expand_child(entity, expansion, embedded)?;
        }
    }

    if schema.track_extra_data {
        if let Some(Value::Object(extra)) = payload.get("extra_data") {
            entity.set_extra_data(extra.clone());
        }
    }

    Ok(())
}

/// Construct or reuse the child entity for one expansion entry.
///
/// A child is reused by identity: when the parent re-parses and the
/// embedded object carries the same id, the existing child instance is
/// repopulated in place rather than replaced, so references held by other
/// callers stay live.
fn expand_child(entity: &mut Entity, expansion: &Expansion, embedded: &Value) -> Result<()> {
    let Value::Object(embedded) = embedded else {
        return Err(ResourceError::Deserialization(format!(
            "embedded {:?} is not a JSON object",
            expansion.json_key
        )));
    };

    let embedded_id = embedded.get("id").and_then(Value::as_i64).map(ResourceId::new);

    if let Some(existing) = entity.child_mut(expansion.attr) {
        if embedded_id.is_some() && existing.id() == embedded_id {
            apply_payload(existing, embedded)?;
            existing.mark_loaded();
            return Ok(());
        }
    }

    let mut child = Entity::new(expansion.child);
    apply_payload(&mut child, embedded)?;
    child.mark_loaded();
    entity.attach_child(expansion.attr, child);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{field, Schema};
    use serde_json::json;

    static CHILD: Schema = Schema {
        rsp_namespace: "part",
        fields: &[field("label").readable()],
        expansions: &[],
        track_extra_data: false,
    };

    static PARENT: Schema = Schema {
        rsp_namespace: "widget",
        fields: &[field("name").readable(), field("secret")],
        expansions: &[Expansion {
            json_key: "part",
            attr: "mainPart",
            child: &CHILD,
        }],
        track_extra_data: true,
    };

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_applies_mapped_fields_and_id() {
        let mut entity = Entity::new(&PARENT);
        apply_payload(
            &mut entity,
            &payload(json!({"id": 3, "name": "gear", "unknown": true})),
        )
        .unwrap();

        assert_eq!(entity.id(), Some(ResourceId::new(3)));
        assert_eq!(entity.get("name"), Some(&AttrValue::Str("gear".into())));
        // Unrecognized fields are discarded; non-deserializable attrs stay put.
        assert_eq!(entity.get("secret"), None);
    }

    #[test]
    fn test_absent_fields_not_nulled() {
        let mut entity = Entity::new(&PARENT);
        apply_payload(&mut entity, &payload(json!({"name": "gear"}))).unwrap();
        apply_payload(&mut entity, &payload(json!({"id": 3}))).unwrap();

        assert_eq!(entity.get("name"), Some(&AttrValue::Str("gear".into())));
    }

    #[test]
    fn test_expands_embedded_child() {
        let mut entity = Entity::new(&PARENT);
        apply_payload(
            &mut entity,
            &payload(json!({"part": {"id": 9, "label": "axle"}})),
        )
        .unwrap();

        let child = entity.child("mainPart").unwrap();
        assert_eq!(child.id(), Some(ResourceId::new(9)));
        assert!(child.loaded());
        assert_eq!(child.get("label"), Some(&AttrValue::Str("axle".into())));
    }

    #[test]
    fn test_absent_embedded_key_leaves_child_absent() {
        let mut entity = Entity::new(&PARENT);
        apply_payload(&mut entity, &payload(json!({"name": "gear"}))).unwrap();
        assert!(entity.child("mainPart").is_none());
    }

    #[test]
    fn test_malformed_embedded_is_deserialization_error() {
        let mut entity = Entity::new(&PARENT);
        let err =
            apply_payload(&mut entity, &payload(json!({"part": [1, 2]}))).unwrap_err();
        assert!(matches!(err, ResourceError::Deserialization(_)));
    }

    #[test]
    fn test_child_reused_by_identity() {
        let mut entity = Entity::new(&PARENT);
        apply_payload(
            &mut entity,
            &payload(json!({"part": {"id": 9, "label": "axle"}})),
        )
        .unwrap();

        // Subscribe to the child, then re-parse the parent with the same
        // child id. The subscription stays live only if the instance was
        // repopulated in place.
        let mut events = entity.child("mainPart").unwrap().subscribe();

        apply_payload(
            &mut entity,
            &payload(json!({"part": {"id": 9, "label": "shaft"}})),
        )
        .unwrap();

        let change = events.try_recv().unwrap();
        assert_eq!(change.attr, "label");
        assert_eq!(change.value, AttrValue::Str("shaft".into()));
    }

    #[test]
    fn test_child_replaced_on_identity_change() {
        let mut entity = Entity::new(&PARENT);
        apply_payload(
            &mut entity,
            &payload(json!({"part": {"id": 9, "label": "axle"}})),
        )
        .unwrap();
        apply_payload(
            &mut entity,
            &payload(json!({"part": {"id": 10, "label": "bolt"}})),
        )
        .unwrap();

        let child = entity.child("mainPart").unwrap();
        assert_eq!(child.id(), Some(ResourceId::new(10)));
        assert_eq!(child.get("label"), Some(&AttrValue::Str("bolt".into())));
    }

    #[test]
    fn test_extra_data_kept_when_opted_in() {
        let mut entity = Entity::new(&PARENT);
        apply_payload(
            &mut entity,
            &payload(json!({"extra_data": {"reviewed": true}})),
        )
        .unwrap();

        let extra = entity.extra_data().unwrap();
        assert_eq!(extra.get("reviewed"), Some(&json!(true)));
    }

    #[test]
    fn test_extra_data_discarded_without_opt_in() {
        let mut entity = Entity::new(&CHILD);
        apply_payload(
            &mut entity,
            &payload(json!({"extra_data": {"reviewed": true}})),
        )
        .unwrap();

        assert!(entity.extra_data().is_none());
    }
}
