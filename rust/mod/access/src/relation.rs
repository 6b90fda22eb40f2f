//! Relationship merging (read path) and diffing (write path).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use gatehouse_store::EntityId;

use crate::error::AccessError;
use crate::model::Resource;

/// One candidate of a many-to-many relationship, seen from the focal entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationInfo {
    /// Id of the related record.
    pub id: EntityId,

    /// Display name of the related record.
    pub name: String,

    /// True if the relation currently holds.
    pub selected: bool,

    /// False for entries the UI must not toggle.
    #[serde(default = "editable_default")]
    pub editable: bool,

    /// The relation holds but the related record is missing from the
    /// candidate catalog (e.g. deleted since).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

fn editable_default() -> bool {
    true
}

/// Overlay the associated records onto the full candidate list.
///
/// Associated records come first in their given order, followed by the
/// remaining candidates in catalog order. Every id appears once. Associated
/// records missing from `candidates` are kept and marked stale.
///
/// An associated record is selected unless it carries an owner attribute
/// that differs from `focal`.
pub fn merge<T: Resource>(
    focal: Option<EntityId>,
    candidates: &[T],
    associated: &[T],
) -> Vec<RelationInfo> {
    let catalog: HashSet<EntityId> = candidates.iter().map(Resource::id).collect();
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut merged = Vec::with_capacity(candidates.len());

    for record in associated {
        if !seen.insert(record.id()) {
            continue;
        }
        let stale = !catalog.contains(&record.id());
        merged.push(RelationInfo {
            id: record.id(),
            name: record.label().to_string(),
            selected: held_by(focal, record),
            editable: !stale,
            stale,
        });
    }

    for record in candidates {
        if !seen.insert(record.id()) {
            continue;
        }
        merged.push(RelationInfo {
            id: record.id(),
            name: record.label().to_string(),
            selected: false,
            editable: true,
            stale: false,
        });
    }

    merged
}

fn held_by<T: Resource>(focal: Option<EntityId>, record: &T) -> bool {
    match record.owner() {
        Some(owner) => focal == Some(owner),
        None => true,
    }
}

/// Fail if any id appears more than once in one relation list.
pub fn ensure_unique(relations: &[RelationInfo]) -> Result<(), AccessError> {
    let mut seen = HashSet::with_capacity(relations.len());
    match relations.iter().find(|r| !seen.insert(r.id)) {
        Some(dup) => Err(AccessError::Invalid(format!("relation id {} listed more than once", dup.id))),
        None => Ok(()),
    }
}

/// Relation writes needed to make the store match an edited list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationDiff {
    /// Every editable entry still or newly selected.
    pub assign: Vec<EntityId>,

    /// Editable entries deselected while the store still holds them.
    pub revoke: Vec<EntityId>,
}

impl RelationDiff {
    /// Diff an edited relation list against the ids currently `held` in the
    /// store. Entries absent from `relations` are left alone.
    ///
    /// Fails if `relations` lists an id twice.
    pub fn compute(relations: &[RelationInfo], held: &[EntityId]) -> Result<Self, AccessError> {
        ensure_unique(relations)?;
        let held: HashSet<EntityId> = held.iter().copied().collect();
        let mut diff = Self::default();
        for relation in relations.iter().filter(|r| r.editable) {
            if relation.selected {
                diff.assign.push(relation.id);
            } else if held.contains(&relation.id) {
                diff.revoke.push(relation.id);
            }
        }
        Ok(diff)
    }

    pub fn is_empty(&self) -> bool {
        self.assign.is_empty() && self.revoke.is_empty()
    }
}
