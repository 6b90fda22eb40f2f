pub mod door;
pub mod key;
pub mod member;
pub mod role;

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use gatehouse_store::{EntityId, EntityKind, EntityStore, Link, StoreError};

use crate::error::{AccessError, WriteFailure, WriteFailures};
use crate::field::{Field, FieldMap, Project, assign_id, to_fields};
use crate::model::{Entity, Resource};
use crate::relation::RelationDiff;

/// The access service. Builds Details aggregates from an [`EntityStore`]
/// and reconciles edited aggregates back into it.
///
/// Holds no state besides the store handle; every call reads fresh.
pub struct AccessService {
    pub(crate) store: Arc<dyn EntityStore>,
}

/// One request of a write fan-out.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Merge-patch a record's attributes.
    Update { kind: EntityKind, id: EntityId, patch: Value },

    /// Set or clear a key's owning member.
    Owner { key_id: EntityId, member_id: Option<EntityId> },

    Link { link: Link, owner_id: EntityId, target_id: EntityId },

    Unlink { link: Link, owner_id: EntityId, target_id: EntityId },
}

impl Write {
    /// Link every assigned id and unlink every revoked one.
    pub fn relation_writes(link: Link, owner_id: EntityId, diff: &RelationDiff) -> Vec<Write> {
        let links = diff.assign.iter().map(|&target_id| Write::Link { link, owner_id, target_id });
        let unlinks = diff.revoke.iter().map(|&target_id| Write::Unlink { link, owner_id, target_id });
        links.chain(unlinks).collect()
    }
}

impl fmt::Display for Write {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Write::Update { kind, id, .. } => write!(f, "update {} {}", kind, id),
            Write::Owner { key_id, member_id: Some(member_id) } => {
                write!(f, "assign key {} to member {}", key_id, member_id)
            }
            Write::Owner { key_id, member_id: None } => write!(f, "release key {}", key_id),
            Write::Link { link, owner_id, target_id } => {
                write!(f, "link {} {} -> {}", link, owner_id, target_id)
            }
            Write::Unlink { link, owner_id, target_id } => {
                write!(f, "unlink {} {} -> {}", link, owner_id, target_id)
            }
        }
    }
}

/// Outcome of a create or save: the re-read aggregate plus every write the
/// store rejected.
///
/// The aggregate reflects the store after all writes settled, so it is
/// worth showing even when some writes failed.
#[derive(Debug)]
pub struct Saved<D> {
    pub details: D,
    pub failures: Vec<WriteFailure>,
}

impl<D> Saved<D> {
    /// True if every write succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// The aggregate if every write succeeded. Otherwise the single failure's
    /// error, or `AccessError::Writes` when several writes failed.
    pub fn into_result(mut self) -> Result<D, AccessError> {
        match self.failures.len() {
            0 => Ok(self.details),
            1 => Err(self.failures.remove(0).error),
            _ => Err(AccessError::Writes(WriteFailures(self.failures))),
        }
    }
}

fn decode<T: DeserializeOwned>(record: Value) -> Result<T, AccessError> {
    serde_json::from_value(record).map_err(|e| AccessError::Store(StoreError::from(e)))
}

fn decode_all<T: DeserializeOwned>(records: Vec<Value>) -> Result<Vec<T>, AccessError> {
    records.into_iter().map(decode).collect()
}

/// Ids of decoded records, in order.
pub(crate) fn ids<T: Resource>(records: &[T]) -> Vec<EntityId> {
    records.iter().map(Resource::id).collect()
}

impl AccessService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    // ── Typed record helpers ──

    pub(crate) async fn list_records<T: Resource>(&self) -> Result<Vec<T>, AccessError> {
        decode_all(self.store.list(T::KIND).await?)
    }

    pub(crate) async fn get_record<T: Resource>(&self, id: EntityId) -> Result<T, AccessError> {
        decode(self.store.get(T::KIND, id).await?)
    }

    pub(crate) async fn related_records<T: Resource>(
        &self,
        link: Link,
        owner_id: EntityId,
    ) -> Result<Vec<T>, AccessError> {
        debug_assert_eq!(link.target(), T::KIND);
        decode_all(self.store.related(link, owner_id).await?)
    }

    /// Simplified `{id, name}` view of every record of a kind, reading the
    /// name through the record's projected name field.
    pub(crate) async fn summaries<T: Project>(&self) -> Result<Vec<Entity>, AccessError> {
        let records: Vec<T> = self.list_records().await?;
        records
            .iter()
            .map(|record| {
                let info = to_fields(record);
                let fields = FieldMap::new(&info)?;
                Ok(Entity {
                    id: record.id(),
                    name: fields.text(T::NAME_FIELD)?,
                })
            })
            .collect()
    }

    /// Build the typed write payload from edited fields, as JSON.
    pub(crate) fn payload<T: Project>(info: &[Field]) -> Result<Value, AccessError> {
        let payload = T::payload(&FieldMap::new(info)?)?;
        serde_json::to_value(&payload).map_err(|e| AccessError::Store(StoreError::from(e)))
    }

    /// Insert a record built from `info` and write the assigned id back into
    /// `info`. Fails without any request if `id` is already set.
    pub(crate) async fn insert_record<T: Project>(
        &self,
        id: Option<EntityId>,
        info: &mut [Field],
    ) -> Result<EntityId, AccessError> {
        if let Some(id) = id {
            return Err(AccessError::AlreadyExists { kind: T::KIND, id });
        }
        let payload = Self::payload::<T>(info)?;
        let created: T = decode(self.store.insert(T::KIND, payload).await?)?;
        let id = created.id();
        assign_id(info, id).map_err(|e| AccessError::created(T::KIND, id, e))?;
        Ok(id)
    }

    /// Read a record, delete it, and return the fields it had.
    pub(crate) async fn delete_record<T: Project>(&self, id: EntityId) -> Result<Vec<Field>, AccessError> {
        let record: T = self.get_record(id).await?;
        self.store.delete(T::KIND, id).await?;
        Ok(to_fields(&record))
    }

    // ── Fan-out writes ──

    /// Issue every write concurrently and wait for all of them.
    ///
    /// A rejected write never cancels its siblings. Returns the failures in
    /// dispatch order.
    pub(crate) async fn dispatch(&self, writes: Vec<Write>) -> Vec<WriteFailure> {
        let outcomes = join_all(writes.iter().map(|write| self.execute(write))).await;
        writes
            .into_iter()
            .zip(outcomes)
            .filter_map(|(write, outcome)| outcome.err().map(|error| WriteFailure { write, error }))
            .collect()
    }

    async fn execute(&self, write: &Write) -> Result<(), AccessError> {
        match write {
            Write::Update { kind, id, patch } => {
                self.store.update(*kind, *id, patch.clone()).await?;
            }
            Write::Owner { key_id, member_id } => {
                self.store
                    .update(EntityKind::Key, *key_id, json!({ "member_id": member_id }))
                    .await?;
            }
            Write::Link { link, owner_id, target_id } => {
                self.store.link(*link, *owner_id, *target_id).await?;
            }
            Write::Unlink { link, owner_id, target_id } => {
                self.store.unlink(*link, *owner_id, *target_id).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_store::MemoryStore;

    use crate::model::{Key, Member};

    fn demo() -> AccessService {
        AccessService::new(Arc::new(MemoryStore::demo()))
    }

    #[tokio::test]
    async fn dispatch_runs_every_write_and_reports_failures() {
        let svc = demo();
        let writes = vec![
            Write::Owner { key_id: 2, member_id: Some(1) },
            Write::Link { link: Link::MemberRoles, owner_id: 1, target_id: 99 },
            Write::Update { kind: EntityKind::Member, id: 1, patch: json!({"name": "John"}) },
        ];
        let failures = svc.dispatch(writes).await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].write.to_string(), "link member roles 1 -> 99");
        assert!(matches!(failures[0].error, AccessError::NotFound { kind: EntityKind::Role, id: 99 }));

        let key: Key = svc.get_record(2).await.unwrap();
        assert_eq!(key.member_id, Some(1));
        let member: Member = svc.get_record(1).await.unwrap();
        assert_eq!(member.name, "John");
    }

    #[tokio::test]
    async fn releasing_a_key_clears_its_owner() {
        let svc = demo();
        let failures = svc.dispatch(vec![Write::Owner { key_id: 1, member_id: None }]).await;
        assert!(failures.is_empty());
        let key: Key = svc.get_record(1).await.unwrap();
        assert_eq!(key.member_id, None);
    }

    #[test]
    fn into_result_surfaces_single_and_aggregate_failures() {
        let clean = Saved { details: 1, failures: Vec::new() };
        assert!(clean.is_clean());
        assert_eq!(clean.into_result().unwrap(), 1);

        let one = Saved {
            details: 1,
            failures: vec![WriteFailure {
                write: Write::Owner { key_id: 3, member_id: Some(2) },
                error: AccessError::NotFound { kind: EntityKind::Key, id: 3 },
            }],
        };
        assert!(matches!(one.into_result(), Err(AccessError::NotFound { id: 3, .. })));

        let failure = |id| WriteFailure {
            write: Write::Update { kind: EntityKind::Door, id, patch: json!({}) },
            error: AccessError::NotFound { kind: EntityKind::Door, id },
        };
        let many = Saved { details: 1, failures: vec![failure(1), failure(2)] };
        match many.into_result() {
            Err(AccessError::Writes(all)) => assert_eq!(all.0.len(), 2),
            other => panic!("expected aggregate failure, got {:?}", other),
        }
    }

    #[test]
    fn relation_writes_link_then_unlink() {
        let diff = RelationDiff { assign: vec![1, 3], revoke: vec![2] };
        let writes = Write::relation_writes(Link::RoleDoors, 5, &diff);
        let rendered: Vec<String> = writes.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["link role doors 5 -> 1", "link role doors 5 -> 3", "unlink role doors 5 -> 2"]
        );
    }

    #[tokio::test]
    async fn summaries_use_the_name_field() {
        let svc = demo();
        let keys = svc.summaries::<Key>().await.unwrap();
        assert_eq!(keys[0], Entity { id: 1, name: "0x012345".into() });
        let members = svc.summaries::<Member>().await.unwrap();
        assert_eq!(members[3].name, "Ringo Starr");
    }
}
