use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Backend-assigned identity of a record.
pub type EntityId = i64;

/// The four record kinds served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Member,
    Key,
    Role,
    Door,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Member,
        EntityKind::Key,
        EntityKind::Role,
        EntityKind::Door,
    ];

    /// Collection segment of the REST path, e.g. `members`.
    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Member => "members",
            EntityKind::Key => "keys",
            EntityKind::Role => "roles",
            EntityKind::Door => "doors",
        }
    }

    /// Parse a singular or plural kind name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "member" | "members" => Some(EntityKind::Member),
            "key" | "keys" => Some(EntityKind::Key),
            "role" | "roles" => Some(EntityKind::Role),
            "door" | "doors" => Some(EntityKind::Door),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Member => "member",
            EntityKind::Key => "key",
            EntityKind::Role => "role",
            EntityKind::Door => "door",
        };
        f.write_str(name)
    }
}

/// A many-to-many relationship sub-resource, seen from its owner.
///
/// `MemberRoles` and `RoleMembers` address the same edges from opposite
/// ends, as do `RoleDoors` and `DoorRoles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    /// `/members/{id}/roles`
    MemberRoles,
    /// `/roles/{id}/members`
    RoleMembers,
    /// `/roles/{id}/doors`
    RoleDoors,
    /// `/doors/{id}/roles`
    DoorRoles,
}

impl Link {
    /// Kind of the record addressed by `{id}`.
    pub fn owner(self) -> EntityKind {
        match self {
            Link::MemberRoles => EntityKind::Member,
            Link::RoleMembers | Link::RoleDoors => EntityKind::Role,
            Link::DoorRoles => EntityKind::Door,
        }
    }

    /// Kind of the records listed under the sub-resource.
    pub fn target(self) -> EntityKind {
        match self {
            Link::MemberRoles | Link::DoorRoles => EntityKind::Role,
            Link::RoleMembers => EntityKind::Member,
            Link::RoleDoors => EntityKind::Door,
        }
    }

    /// Relative path of the sub-resource: `members/3/roles`.
    pub fn path(self, owner_id: EntityId) -> String {
        format!("{}/{}/{}", self.owner().plural(), owner_id, self.target().plural())
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.owner(), self.target().plural())
    }
}

/// EntityStore is the backend seam: CRUD per kind plus relationship
/// sub-resources.
///
/// Records are JSON objects carrying an integer `id`. `update` takes a JSON
/// merge-patch (RFC 7386): members set to `null` clear the attribute.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// List every record of a kind, in catalog order.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError>;

    /// Get one record. Returns `StoreError::NotFound` if it does not exist.
    async fn get(&self, kind: EntityKind, id: EntityId) -> Result<Value, StoreError>;

    /// Insert a new record. The store assigns the id and returns the stored record.
    async fn insert(&self, kind: EntityKind, record: Value) -> Result<Value, StoreError>;

    /// Apply a merge-patch to an existing record and return the result.
    async fn update(&self, kind: EntityKind, id: EntityId, patch: Value) -> Result<Value, StoreError>;

    /// Delete a record.
    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<(), StoreError>;

    /// List the records related to `owner_id` through `link`.
    async fn related(&self, link: Link, owner_id: EntityId) -> Result<Vec<Value>, StoreError>;

    /// Add the edge `owner_id -> target_id`. Adding an existing edge is a no-op.
    async fn link(&self, link: Link, owner_id: EntityId, target_id: EntityId) -> Result<(), StoreError>;

    /// Remove the edge `owner_id -> target_id`. Removing a missing edge is a no-op.
    async fn unlink(&self, link: Link, owner_id: EntityId, target_id: EntityId) -> Result<(), StoreError>;
}
