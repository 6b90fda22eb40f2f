//! Raw backend records, exactly as the store serves them.

pub mod door;
pub mod key;
pub mod member;
pub mod role;

pub use door::{Door, DoorPayload};
pub use key::{Key, KeyPayload};
pub use member::{Member, MemberPayload};
pub use role::{Role, RolePayload};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use gatehouse_store::{EntityId, EntityKind};

/// A record stored under one [`EntityKind`].
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    /// Name shown for this record in relation lists.
    fn label(&self) -> &str;

    /// Owning record, when membership in a relation is an attribute of this
    /// record rather than an edge (a key's `member_id`).
    fn owner(&self) -> Option<EntityId> {
        None
    }
}

/// Simplified list view of any record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
}
