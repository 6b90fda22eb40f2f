//! Entity store abstraction for the access-control backend.
//!
//! The [`EntityStore`] trait is the only seam between the reconciliation
//! layer and the backend. Two implementations ship with the crate:
//!
//! - [`HttpStore`] talks to the REST backend (`/members`, `/keys`, ...).
//! - [`MemoryStore`] keeps everything in process. Used by tests and demos.
//!
//! Records cross the trait as raw JSON objects; typed decoding is the
//! caller's business.

pub mod error;
pub mod http;
pub mod memory;
pub mod patch;
pub mod traits;

pub use error::StoreError;
pub use http::{HttpStore, HttpStoreConfig};
pub use memory::MemoryStore;
pub use patch::merge_patch;
pub use traits::{EntityId, EntityKind, EntityStore, Link};
