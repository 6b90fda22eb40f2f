use serde_json::Value;

use gatehouse_store::{EntityId, EntityKind};

use crate::details::KeyDetails;
use crate::error::AccessError;
use crate::field::{blank_fields, to_fields};
use crate::model::{Entity, Key, Member};
use crate::relation::{RelationDiff, RelationInfo, merge};
use crate::service::{AccessService, Saved, Write};

/// The member a key's relation list selects, if any.
fn selected_owner(members: &[RelationInfo]) -> Result<Option<EntityId>, AccessError> {
    let mut selected = members.iter().filter(|m| m.editable && m.selected);
    let owner = selected.next().map(|m| m.id);
    if selected.next().is_some() {
        return Err(AccessError::Invalid("a key can be owned by at most one member".into()));
    }
    Ok(owner)
}

impl AccessService {
    /// List all keys as `{id, name}`, where name is the key's uuid.
    pub async fn list_keys(&self) -> Result<Vec<Entity>, AccessError> {
        self.summaries::<Key>().await
    }

    /// Get KeyDetails by id.
    pub async fn key_details(&self, id: EntityId) -> Result<KeyDetails, AccessError> {
        let (key, members) = tokio::try_join!(
            self.get_record::<Key>(id),
            self.list_records::<Member>()
        )?;
        // An owner missing from the catalog still shows up, flagged stale.
        let owner: Vec<Member> = key
            .member_id
            .map(|member_id| {
                members
                    .iter()
                    .find(|m| m.id == member_id)
                    .cloned()
                    .unwrap_or_else(|| Member { id: member_id, name: format!("member {member_id}") })
            })
            .into_iter()
            .collect();

        Ok(KeyDetails {
            id: Some(key.id),
            info: to_fields(&key),
            members: merge(Some(id), &members, &owner),
        })
    }

    /// A placeholder key that does not exist on the backend yet.
    pub async fn empty_key_details(&self) -> Result<KeyDetails, AccessError> {
        let members = self.list_records::<Member>().await?;
        Ok(KeyDetails {
            id: None,
            info: blank_fields::<Key>(),
            members: merge(None, &members, &[]),
        })
    }

    /// Create a key, then hand it to the selected member.
    ///
    /// Fails with `AlreadyExists` if `details.id` is set.
    pub async fn create_key(&self, mut details: KeyDetails) -> Result<Saved<KeyDetails>, AccessError> {
        details.validate()?;
        selected_owner(&details.members)?;
        let id = self.insert_record::<Key>(details.id, &mut details.info).await?;
        details.id = Some(id);
        self.reconcile_key(id, &details, None)
            .await
            .map_err(|e| AccessError::created(EntityKind::Key, id, e))
    }

    /// Save an existing key's uuid and owner, then re-read it.
    pub async fn save_key(&self, details: KeyDetails) -> Result<Saved<KeyDetails>, AccessError> {
        let id = details.id.ok_or(AccessError::Unsaved { kind: EntityKind::Key })?;
        details.validate()?;
        selected_owner(&details.members)?;
        let patch = Self::payload::<Key>(&details.info)?;
        self.reconcile_key(id, &details, Some(patch)).await
    }

    /// Delete a key. Returns its last fields with an empty member list.
    pub async fn remove_key(&self, id: EntityId) -> Result<KeyDetails, AccessError> {
        let info = self.delete_record::<Key>(id).await?;
        Ok(KeyDetails {
            id: Some(id),
            info,
            members: Vec::new(),
        })
    }

    async fn reconcile_key(
        &self,
        id: EntityId,
        details: &KeyDetails,
        patch: Option<Value>,
    ) -> Result<Saved<KeyDetails>, AccessError> {
        let current: Key = self.get_record(id).await?;
        let held: Vec<EntityId> = current.member_id.into_iter().collect();
        let owner = RelationDiff::compute(&details.members, &held)?;

        let mut writes = Vec::new();
        if let Some(patch) = patch {
            writes.push(Write::Update { kind: EntityKind::Key, id, patch });
        }
        if let Some(&member_id) = owner.assign.first() {
            writes.push(Write::Owner { key_id: id, member_id: Some(member_id) });
        } else if !owner.revoke.is_empty() {
            writes.push(Write::Owner { key_id: id, member_id: None });
        }

        let failures = self.dispatch(writes).await;
        let details = self.key_details(id).await?;
        Ok(Saved { details, failures })
    }
}
