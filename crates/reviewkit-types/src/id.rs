//! Resource identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A server-assigned resource identity.
///
/// Identities are integers handed out by the backend when a resource is
/// first persisted. A client-constructed entity has no identity until its
/// first successful save.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(i64);

impl ResourceId {
    /// Create a resource identity from its raw integer value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Return the raw integer value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
