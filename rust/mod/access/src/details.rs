//! Details aggregates exchanged with the UI.
//!
//! An aggregate with `id == None` describes a record that has not been
//! created yet. Aggregates are rebuilt from the store on every read and
//! after every write.

use serde::{Deserialize, Serialize};

use gatehouse_store::EntityId;

use crate::error::AccessError;
use crate::field::Field;
use crate::relation::{RelationInfo, ensure_unique};

/// All details about a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDetails {
    pub id: Option<EntityId>,

    /// e.g. id, name.
    pub info: Vec<Field>,

    /// Every role, assigned ones first.
    pub roles: Vec<RelationInfo>,

    /// Every key, owned ones first.
    pub keys: Vec<RelationInfo>,
}

/// All details about a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDetails {
    pub id: Option<EntityId>,
    pub info: Vec<Field>,

    /// Every member; at most one (the owner) is selected.
    pub members: Vec<RelationInfo>,
}

/// All details about a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDetails {
    pub id: Option<EntityId>,
    pub info: Vec<Field>,

    /// Doors this role opens, then the rest.
    pub doors: Vec<RelationInfo>,

    /// Members holding this role, then the rest.
    pub people: Vec<RelationInfo>,
}

/// All details about a door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorDetails {
    pub id: Option<EntityId>,
    pub info: Vec<Field>,

    /// Roles granting access to this door, then the rest.
    pub roles: Vec<RelationInfo>,
}

// ── Validation ──
//
// Run before a create or save issues any request.

impl MemberDetails {
    pub fn validate(&self) -> Result<(), AccessError> {
        ensure_unique(&self.roles)?;
        ensure_unique(&self.keys)
    }
}

impl KeyDetails {
    pub fn validate(&self) -> Result<(), AccessError> {
        ensure_unique(&self.members)
    }
}

impl RoleDetails {
    pub fn validate(&self) -> Result<(), AccessError> {
        ensure_unique(&self.doors)?;
        ensure_unique(&self.people)
    }
}

impl DoorDetails {
    pub fn validate(&self) -> Result<(), AccessError> {
        ensure_unique(&self.roles)
    }
}
