//! Access module: relationship reconciliation for members, keys, roles and doors.
//!
//! # Resources
//!
//! - **Member**: a person; holds roles and owns keys
//! - **Key**: a physical credential, owned by at most one member
//! - **Role**: grants access to doors; assigned to members
//! - **Door**: a controlled entry point
//!
//! Each resource is exchanged with the UI as a *Details* aggregate: the
//! entity's editable [`Field`]s plus one [`RelationInfo`] list per
//! relationship, where every candidate appears once and associated
//! candidates come first.
//!
//! # Usage
//!
//! ```ignore
//! use gatehouse_access::AccessService;
//! use gatehouse_store::MemoryStore;
//!
//! let service = AccessService::new(Arc::new(MemoryStore::demo()));
//! let mut details = service.member_details(1).await?;
//! details.roles[0].selected = false;
//! let saved = service.save_member(details).await?;
//! ```

pub mod details;
pub mod error;
pub mod field;
pub mod model;
pub mod relation;
pub mod service;

pub use details::{DoorDetails, KeyDetails, MemberDetails, RoleDetails};
pub use error::{AccessError, WriteFailure, WriteFailures};
pub use field::{Field, FieldMap, FieldSpec, FieldValue, Project};
pub use model::{Door, Entity, Key, Member, Resource, Role};
pub use relation::{RelationDiff, RelationInfo, merge};
pub use service::{AccessService, Saved, Write};

pub use gatehouse_store::{EntityId, EntityKind};
