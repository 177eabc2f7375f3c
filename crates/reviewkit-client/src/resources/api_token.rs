//! The API token resource.

use chrono::{DateTime, Utc};
use reviewkit_types::{AttrValue, ResourceError, Result};
use serde_json::{json, Map, Value};

use crate::entity::AttrView;
use crate::resource::ResourceKind;
use crate::schema::{field, Schema};

/// Mapping table for API tokens.
///
/// `expires`, `note`, and `policy` are writable; the remaining wire fields
/// are server-maintained and only populated from responses.
/// `localSitePrefix` and `userName` are local-only hierarchy attributes
/// used to resolve the resource URL.
pub static SCHEMA: Schema = Schema {
    rsp_namespace: "api_token",
    fields: &[
        field("deprecated")
            .readable()
            .with_default(|| AttrValue::Bool(false)),
        field("expired")
            .readable()
            .with_default(|| AttrValue::Bool(false)),
        field("expires")
            .writable()
            .deserialize_with(timestamp_from_wire),
        field("invalidDate")
            .json("invalid_date")
            .deserialize_with(timestamp_from_wire),
        field("invalidReason").json("invalid_reason").readable(),
        field("lastUsed")
            .json("last_used")
            .deserialize_with(timestamp_from_wire),
        field("localSitePrefix"),
        field("note").read_write(),
        field("policy")
            .serialize_with(policy_to_wire)
            .deserialize_with(policy_from_wire)
            .with_default(|| AttrValue::Json(json!({}))),
        field("tokenValue").json("token").readable(),
        field("userName"),
        field("valid").readable().with_default(|| AttrValue::Bool(true)),
    ],
    expansions: &[],
    track_extra_data: false,
};

/// An API token owned by a user.
pub struct ApiToken;

impl ResourceKind for ApiToken {
    const NAME: &'static str = "api_token";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn collection_url(attrs: &AttrView<'_>) -> Result<String> {
        let username = attrs.str("userName").ok_or_else(|| {
            ResourceError::Url("userName must be set to resolve an API token URL".to_string())
        })?;
        let prefix = attrs.str("localSitePrefix").unwrap_or("");
        Ok(format!("{prefix}api/users/{username}/api-tokens/"))
    }
}

/// The policy allowing full access to every resource.
pub fn custom_policy() -> Value {
    json!({
        "resources": {
            "*": {
                "allow": ["*"],
                "block": [],
            },
        },
    })
}

/// The policy restricting the token to read-only access.
pub fn read_only_policy() -> Value {
    json!({
        "resources": {
            "*": {
                "allow": ["GET", "HEAD", "OPTIONS"],
                "block": ["*"],
            },
        },
    })
}

/// The default read/write policy.
pub fn read_write_policy() -> Value {
    json!({})
}

/// Token policies travel outbound as a JSON-encoded string.
fn policy_to_wire(value: &AttrValue, _view: &AttrView<'_>) -> Result<Option<Value>> {
    let encoded = serde_json::to_string(&value.to_json())
        .map_err(|e| ResourceError::Validation(format!("policy is not serializable: {e}")))?;
    Ok(Some(Value::String(encoded)))
}

/// Inbound policies may arrive as a structure or as an encoded string.
fn policy_from_wire(value: &Value, _payload: &Map<String, Value>) -> Result<AttrValue> {
    match value {
        Value::String(encoded) => serde_json::from_str(encoded)
            .map(AttrValue::Json)
            .map_err(|e| ResourceError::Deserialization(format!("policy is not valid JSON: {e}"))),
        other => Ok(AttrValue::Json(other.clone())),
    }
}

/// Parse an RFC 3339 date field, keeping explicit nulls.
fn timestamp_from_wire(value: &Value, _payload: &Map<String, Value>) -> Result<AttrValue> {
    match value {
        Value::Null => Ok(AttrValue::Null),
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| AttrValue::Timestamp(dt.with_timezone(&Utc)))
            .map_err(|e| ResourceError::Deserialization(format!("bad date {raw:?}: {e}"))),
        other => Err(ResourceError::Deserialization(format!(
            "date field is not a string: {other}"
        ))),
    }
}
