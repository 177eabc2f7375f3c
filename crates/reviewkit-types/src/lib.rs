//! # reviewkit Types
//!
//! Foundational types for the reviewkit resource synchronization core.
//!
//! This crate provides the type system shared by every reviewkit layer:
//!
//! - **`error`** - The operation error taxonomy (validation, network, API,
//!   deserialization, URL resolution)
//! - **`value`** - The closed, tagged attribute value type
//! - **`id`** - Server-assigned resource identity
//! - **`envelope`** - The wire envelope wrapping every API payload
//!
//! ## Architecture Role
//!
//! `reviewkit-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!     reviewkit-types (this crate)
//!             │
//!             ▼
//!     reviewkit-client
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde where they cross the wire
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod envelope;
pub mod error;
pub mod id;
pub mod value;

pub use envelope::Envelope;
pub use error::{ResourceError, Result};
pub use id::ResourceId;
pub use value::AttrValue;
