//! # reviewkit Client
//!
//! The resource synchronization core of the reviewkit data layer: typed
//! entity models kept in sync with a REST backend.
//!
//! - **`schema`** - Declarative per-kind attribute mapping tables
//! - **`entity`** - Entity state, dirty tracking, change notifications
//! - **`validation`** - Ordered rule chains run before mutating operations
//! - **`expand`** - Expansion of embedded JSON objects into child entities
//! - **`engine`** - The fetch/save/destroy orchestrator
//! - **`transport`** - The HTTP boundary (reqwest, injected CSRF token)
//! - **`resource`** - The `ResourceKind` trait and typed `Resource<K>` handle
//! - **`resources`** - Concrete resource kinds (API tokens, diff comments, ...)
//!
//! ## Control flow
//!
//! ```text
//! caller ── fetch/save/destroy ──▶ SyncEngine
//!     │                               │ validate (save only)
//!     │                               │ resolve URL
//!     │                               │ build payload from dirty attrs
//!     │                               ▼
//!     │                           Transport ──▶ REST backend
//!     │                               │
//!     ◀── entity updated, Result ─────┘ parse envelope, expand children
//! ```

pub mod engine;
pub mod entity;
pub mod expand;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod transport;
pub mod validation;

pub use engine::{SaveOptions, SyncEngine};
pub use entity::{AttrChange, AttrView, Entity, ParentLink};
pub use resource::{Resource, ResourceKind};
pub use schema::{Expansion, FieldSpec, Schema};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
pub use validation::ValidationRule;

pub use reviewkit_types::{AttrValue, Envelope, ResourceError, ResourceId, Result};
