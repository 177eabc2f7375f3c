//! Typed error definitions for reviewkit operations.
//!
//! Every synchronization operation resolves to either updated entity state or
//! one of these error kinds. All errors are designed to be:
//!
//! - **Serializable** for logging/IPC via serde
//! - **Displayable** via the Display trait
//! - **Matchable** for error handling logic via enum variants
//! - **Composable** via thiserror derive macros

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by resource synchronization operations.
///
/// The four network-operation kinds (`Validation`, `Network`, `Api`,
/// `Deserialization`) map one-to-one onto the ways a fetch/save/destroy can
/// fail. `Url` is raised locally when a resource's address cannot be
/// computed because a required hierarchy attribute is missing.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "error")]
pub enum ResourceError {
    /// An attribute failed local validation before any request was built.
    ///
    /// Carries the first violated rule's message. Never retried
    /// automatically; no network call is issued.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Transport failure: the request produced no response.
    ///
    /// Retry policy, if any, belongs to the caller.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-ok envelope status.
    ///
    /// The code and message are surfaced verbatim, never reinterpreted.
    #[error("API error ({code}): {message}")]
    Api {
        /// The envelope's error status code.
        code: String,
        /// Error message from the server, if any.
        message: String,
    },

    /// The response arrived but did not match the expected shape.
    ///
    /// Distinct from `Api`: the HTTP/API layer reported success.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A resource URL could not be computed from the current attributes.
    #[error("Cannot compute resource URL: {0}")]
    Url(String),
}

/// Standard Result type using ResourceError.
pub type Result<T> = std::result::Result<T, ResourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = ResourceError::Api {
            code: "does-not-exist".to_string(),
            message: "Object does not exist".to_string(),
        };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("Api"));
        assert!(json.contains("does-not-exist"));

        let deserialized: ResourceError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = ResourceError::Validation("beginLineNum must be >= 0".to_string());
        assert_eq!(format!("{err}"), "Validation failed: beginLineNum must be >= 0");

        let err = ResourceError::Api {
            code: "fail".to_string(),
            message: "Missing fields".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("fail"));
        assert!(msg.contains("Missing fields"));
    }
}
