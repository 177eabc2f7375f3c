//! Tagged attribute values.
//!
//! Entity attributes hold values from a closed set of shapes rather than an
//! open duck-typed bag. Anything structured that has no dedicated variant
//! (policy documents, extra_data blobs) travels as `Json`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{ResourceError, Result};

/// A single attribute value.
///
/// `Null` is an explicit value and is distinct from an attribute being
/// absent from an entity altogether.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Explicit null.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer (line numbers, sizes, foreign ids).
    Int(i64),
    /// Text.
    Str(String),
    /// A point in time, carried on the wire as an RFC 3339 string.
    Timestamp(DateTime<Utc>),
    /// Arbitrary JSON structure (policy documents, extra_data).
    Json(Value),
}

impl AttrValue {
    /// Returns the boolean value, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string value, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp value, if this is a `Timestamp`.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns the JSON value, if this is a `Json`.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// True when this value is the explicit `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to the wire representation.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::from(*n),
            Self::Str(s) => Value::String(s.clone()),
            Self::Timestamp(t) => Value::String(t.to_rfc3339()),
            Self::Json(v) => v.clone(),
        }
    }

    /// Convert from a wire value.
    ///
    /// Numbers must be integral; floats have no attribute representation and
    /// are rejected. Objects and arrays become `Json`.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => n.as_i64().map(Self::Int).ok_or_else(|| {
                ResourceError::Deserialization(format!("non-integer number: {n}"))
            }),
            Value::String(s) => Ok(Self::Str(s.clone())),
            Value::Array(_) | Value::Object(_) => Ok(Self::Json(value.clone())),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let values = [
            AttrValue::Null,
            AttrValue::Bool(true),
            AttrValue::Int(-3),
            AttrValue::Str("note".to_string()),
            AttrValue::Json(json!({"resources": {"*": {"allow": ["*"]}}})),
        ];

        for value in values {
            let wire = value.to_json();
            assert_eq!(AttrValue::from_json(&wire).unwrap(), value);
        }
    }

    #[test]
    fn test_float_rejected() {
        let err = AttrValue::from_json(&json!(1.5)).unwrap_err();
        assert!(matches!(err, ResourceError::Deserialization(_)));
    }

    #[test]
    fn test_null_is_not_absent() {
        assert!(AttrValue::Null.is_null());
        assert!(!AttrValue::Bool(false).is_null());
    }
}
