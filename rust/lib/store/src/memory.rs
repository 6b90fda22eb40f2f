use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::patch::merge_patch;
use crate::traits::{EntityId, EntityKind, EntityStore, Link};

/// MemoryStore is an in-process [`EntityStore`].
///
/// Each instance owns its own tables, so tests can build isolated fixtures.
/// Ids come from a per-kind counter and are never reused, even after a
/// delete.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    records: BTreeMap<EntityKind, BTreeMap<EntityId, Value>>,
    /// Highest id ever assigned, per kind.
    issued: BTreeMap<EntityKind, EntityId>,
    /// (member_id, role_id)
    member_roles: BTreeSet<(EntityId, EntityId)>,
    /// (door_id, role_id)
    door_roles: BTreeSet<(EntityId, EntityId)>,
}

/// Normalise a link to its edge table and `(member|door, role)` key.
fn edge(link: Link, owner_id: EntityId, target_id: EntityId) -> (EdgeTable, (EntityId, EntityId)) {
    match link {
        Link::MemberRoles => (EdgeTable::MemberRoles, (owner_id, target_id)),
        Link::RoleMembers => (EdgeTable::MemberRoles, (target_id, owner_id)),
        Link::DoorRoles => (EdgeTable::DoorRoles, (owner_id, target_id)),
        Link::RoleDoors => (EdgeTable::DoorRoles, (target_id, owner_id)),
    }
}

#[derive(Clone, Copy)]
enum EdgeTable {
    MemberRoles,
    DoorRoles,
}

impl Tables {
    fn table(&self, kind: EntityKind) -> Option<&BTreeMap<EntityId, Value>> {
        self.records.get(&kind)
    }

    fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        self.table(kind).is_some_and(|t| t.contains_key(&id))
    }

    fn require(&self, kind: EntityKind, id: EntityId) -> Result<(), StoreError> {
        if self.contains(kind, id) {
            Ok(())
        } else {
            Err(StoreError::NotFound { kind, id })
        }
    }

    fn next_id(&mut self, kind: EntityKind) -> EntityId {
        let issued = self.issued.entry(kind).or_default();
        *issued += 1;
        *issued
    }

    /// Store a record under a fresh id and return it with the id set.
    fn put(&mut self, kind: EntityKind, mut record: Map<String, Value>) -> Value {
        let id = self.next_id(kind);
        record.insert("id".to_string(), json!(id));
        let record = Value::Object(record);
        self.records.entry(kind).or_default().insert(id, record.clone());
        record
    }

    fn edges(&self, table: EdgeTable) -> &BTreeSet<(EntityId, EntityId)> {
        match table {
            EdgeTable::MemberRoles => &self.member_roles,
            EdgeTable::DoorRoles => &self.door_roles,
        }
    }

    fn edges_mut(&mut self, table: EdgeTable) -> &mut BTreeSet<(EntityId, EntityId)> {
        match table {
            EdgeTable::MemberRoles => &mut self.member_roles,
            EdgeTable::DoorRoles => &mut self.door_roles,
        }
    }

    fn has_edge(&self, link: Link, owner_id: EntityId, target_id: EntityId) -> bool {
        let (table, key) = edge(link, owner_id, target_id);
        self.edges(table).contains(&key)
    }

    /// Drop every edge touching a deleted record.
    fn cascade(&mut self, kind: EntityKind, id: EntityId) {
        match kind {
            EntityKind::Member => {
                self.member_roles.retain(|(m, _)| *m != id);
                if let Some(keys) = self.records.get_mut(&EntityKind::Key) {
                    for key in keys.values_mut() {
                        if key.get("member_id").and_then(Value::as_i64) == Some(id) {
                            merge_patch(key, &json!({"member_id": null}));
                        }
                    }
                }
            }
            EntityKind::Role => {
                self.member_roles.retain(|(_, r)| *r != id);
                self.door_roles.retain(|(_, r)| *r != id);
            }
            EntityKind::Door => self.door_roles.retain(|(d, _)| *d != id),
            EntityKind::Key => {}
        }
    }
}

/// Build a record from attribute pairs.
fn attrs<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create a store seeded with a small demo catalog: four members, four
    /// keys, five roles, four doors and a handful of role assignments.
    pub fn demo() -> Self {
        let mut tables = Tables::default();
        let members = ["John Lennon", "George Harrison", "Paul McCartney", "Ringo Starr"];
        for name in members {
            tables.put(EntityKind::Member, attrs([("name", json!(name))]));
        }
        let keys = [("0x012345", 1), ("0x543210", 2), ("0xffffff", 3), ("0xa092a0", 1)];
        for (uuid, member_id) in keys {
            tables.put(EntityKind::Key, attrs([("uuid", json!(uuid)), ("member_id", json!(member_id))]));
        }
        for name in ["Instructor", "Member", "Metal Shop", "Owner", "Visitor"] {
            tables.put(EntityKind::Role, attrs([("name", json!(name))]));
        }
        for name in ["Front Door", "Cafe", "Coworking Space", "Metal Shop"] {
            tables.put(EntityKind::Door, attrs([("name", json!(name))]));
        }
        tables.member_roles = [(1, 4), (1, 1), (2, 2), (3, 2), (3, 3), (4, 5)].into();
        tables.door_roles = [
            (1, 1), (1, 2), (1, 4), (1, 5),
            (2, 2), (2, 4),
            (3, 2), (3, 4),
            (4, 3), (4, 4),
        ]
        .into();
        Self {
            tables: RwLock::new(tables),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .table(kind)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, kind: EntityKind, id: EntityId) -> Result<Value, StoreError> {
        let tables = self.tables.read().await;
        tables
            .table(kind)
            .and_then(|t| t.get(&id))
            .cloned()
            .ok_or(StoreError::NotFound { kind, id })
    }

    async fn insert(&self, kind: EntityKind, record: Value) -> Result<Value, StoreError> {
        let Value::Object(mut record) = record else {
            return Err(StoreError::Decode(format!("{kind} record must be a JSON object")));
        };
        record.remove("id");
        let mut tables = self.tables.write().await;
        let stored = tables.put(kind, record);
        debug!("MemoryStore: inserted {} {}", kind, stored["id"]);
        Ok(stored)
    }

    async fn update(&self, kind: EntityKind, id: EntityId, mut patch: Value) -> Result<Value, StoreError> {
        // Identity is immutable once assigned.
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
        }
        let mut tables = self.tables.write().await;
        let record = tables
            .records
            .get_mut(&kind)
            .and_then(|t| t.get_mut(&id))
            .ok_or(StoreError::NotFound { kind, id })?;
        merge_patch(record, &patch);
        debug!("MemoryStore: updated {} {}", kind, id);
        Ok(record.clone())
    }

    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .records
            .get_mut(&kind)
            .and_then(|t| t.remove(&id));
        if removed.is_none() {
            return Err(StoreError::NotFound { kind, id });
        }
        tables.cascade(kind, id);
        debug!("MemoryStore: deleted {} {}", kind, id);
        Ok(())
    }

    async fn related(&self, link: Link, owner_id: EntityId) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        tables.require(link.owner(), owner_id)?;
        Ok(tables
            .table(link.target())
            .map(|t| {
                t.iter()
                    .filter(|(target_id, _)| tables.has_edge(link, owner_id, **target_id))
                    .map(|(_, record)| record.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn link(&self, link: Link, owner_id: EntityId, target_id: EntityId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.require(link.owner(), owner_id)?;
        tables.require(link.target(), target_id)?;
        let (table, key) = edge(link, owner_id, target_id);
        tables.edges_mut(table).insert(key);
        debug!("MemoryStore: linked {} {} -> {}", link, owner_id, target_id);
        Ok(())
    }

    async fn unlink(&self, link: Link, owner_id: EntityId, target_id: EntityId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.require(link.owner(), owner_id)?;
        let (table, key) = edge(link, owner_id, target_id);
        tables.edges_mut(table).remove(&key);
        debug!("MemoryStore: unlinked {} {} -> {}", link, owner_id, target_id);
        Ok(())
    }
}
