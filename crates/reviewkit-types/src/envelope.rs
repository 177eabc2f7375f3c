//! The wire envelope wrapping every API payload.
//!
//! Responses look like:
//!
//! ```json
//! {"stat": "ok", "api_token": {"id": 1, "note": "..."}}
//! ```
//!
//! or, on failure:
//!
//! ```json
//! {"stat": "fail", "err": {"code": 105, "msg": "Missing fields"}}
//! ```

use serde_json::{Map, Value};

use crate::error::{ResourceError, Result};

/// Envelope status value indicating success.
pub const STAT_OK: &str = "ok";

/// A parsed wire envelope: the `stat` field plus the namespaced payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    stat: String,
    rest: Map<String, Value>,
}

impl Envelope {
    /// Parse the outer envelope object.
    ///
    /// The body must be a JSON object with a string `stat` field; anything
    /// else is a deserialization error (the HTTP layer reported success but
    /// the shape is wrong).
    pub fn parse(body: Value) -> Result<Self> {
        let Value::Object(mut map) = body else {
            return Err(ResourceError::Deserialization(
                "response body is not a JSON object".to_string(),
            ));
        };

        let stat = match map.remove("stat") {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(ResourceError::Deserialization(format!(
                    "envelope stat is not a string: {other}"
                )))
            }
            None => {
                return Err(ResourceError::Deserialization(
                    "envelope is missing the stat field".to_string(),
                ))
            }
        };

        Ok(Self { stat, rest: map })
    }

    /// The envelope's status value.
    pub fn stat(&self) -> &str {
        &self.stat
    }

    /// True when the envelope reports success.
    pub fn is_ok(&self) -> bool {
        self.stat == STAT_OK
    }

    /// Error out on a non-ok `stat`, surfacing the status code and the
    /// server's `err.msg` message verbatim.
    pub fn ensure_ok(&self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(ResourceError::Api {
                code: self.stat.clone(),
                message: error_message(&self.rest),
            })
        }
    }

    /// Extract the payload object nested under `namespace`.
    ///
    /// A non-ok `stat` becomes an API error via [`Self::ensure_ok`]. A
    /// missing or non-object namespace on a successful envelope is a
    /// deserialization error.
    pub fn into_payload(mut self, namespace: &str) -> Result<Map<String, Value>> {
        self.ensure_ok()?;

        match self.rest.remove(namespace) {
            Some(Value::Object(payload)) => Ok(payload),
            Some(_) => Err(ResourceError::Deserialization(format!(
                "payload at {namespace:?} is not a JSON object"
            ))),
            None => Err(ResourceError::Deserialization(format!(
                "envelope is missing the {namespace:?} payload"
            ))),
        }
    }
}

/// Pull the human-readable message out of the envelope's `err` object.
fn error_message(rest: &Map<String, Value>) -> String {
    rest.get("err")
        .and_then(|err| err.get("msg"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope() {
        let envelope = Envelope::parse(json!({
            "stat": "ok",
            "api_token": {"id": 1, "note": "ci token"},
        }))
        .unwrap();

        assert!(envelope.is_ok());

        let payload = envelope.into_payload("api_token").unwrap();
        assert_eq!(payload.get("id"), Some(&json!(1)));
    }

    #[test]
    fn test_error_envelope_surfaced_verbatim() {
        let envelope = Envelope::parse(json!({
            "stat": "fail",
            "err": {"code": 105, "msg": "Missing fields"},
        }))
        .unwrap();

        let err = envelope.into_payload("api_token").unwrap_err();
        assert_eq!(
            err,
            ResourceError::Api {
                code: "fail".to_string(),
                message: "Missing fields".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_stat_is_deserialization_error() {
        let err = Envelope::parse(json!({"api_token": {}})).unwrap_err();
        assert!(matches!(err, ResourceError::Deserialization(_)));
    }

    #[test]
    fn test_missing_namespace_is_deserialization_error() {
        let envelope = Envelope::parse(json!({"stat": "ok"})).unwrap();
        let err = envelope.into_payload("api_token").unwrap_err();
        assert!(matches!(err, ResourceError::Deserialization(_)));
    }

    #[test]
    fn test_non_object_body() {
        let err = Envelope::parse(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ResourceError::Deserialization(_)));
    }
}
