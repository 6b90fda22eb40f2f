use serde_json::Value;

use gatehouse_store::{EntityId, EntityKind, Link};

use crate::details::MemberDetails;
use crate::error::AccessError;
use crate::field::{blank_fields, to_fields};
use crate::model::{Entity, Key, Member, Role};
use crate::relation::{RelationDiff, merge};
use crate::service::{AccessService, Saved, Write, ids};

impl AccessService {
    /// List all members as `{id, name}`.
    pub async fn list_members(&self) -> Result<Vec<Entity>, AccessError> {
        self.summaries::<Member>().await
    }

    /// Get MemberDetails by id.
    pub async fn member_details(&self, id: EntityId) -> Result<MemberDetails, AccessError> {
        let (member, roles, held, keys) = tokio::try_join!(
            self.get_record::<Member>(id),
            self.list_records::<Role>(),
            self.related_records::<Role>(Link::MemberRoles, id),
            self.list_records::<Key>()
        )?;
        let owned: Vec<Key> = keys
            .iter()
            .filter(|k| k.member_id == Some(id))
            .cloned()
            .collect();

        Ok(MemberDetails {
            id: Some(member.id),
            info: to_fields(&member),
            roles: merge(Some(id), &roles, &held),
            keys: merge(Some(id), &keys, &owned),
        })
    }

    /// A placeholder member that does not exist on the backend yet.
    pub async fn empty_member_details(&self) -> Result<MemberDetails, AccessError> {
        let (roles, keys) = tokio::try_join!(
            self.list_records::<Role>(),
            self.list_records::<Key>()
        )?;
        Ok(MemberDetails {
            id: None,
            info: blank_fields::<Member>(),
            roles: merge(None, &roles, &[]),
            keys: merge(None, &keys, &[]),
        })
    }

    /// Create a member, then assign its selected roles and keys.
    ///
    /// Fails with `AlreadyExists` if `details.id` is set.
    pub async fn create_member(&self, mut details: MemberDetails) -> Result<Saved<MemberDetails>, AccessError> {
        details.validate()?;
        let id = self.insert_record::<Member>(details.id, &mut details.info).await?;
        details.id = Some(id);
        self.reconcile_member(id, &details, None)
            .await
            .map_err(|e| AccessError::created(EntityKind::Member, id, e))
    }

    /// Save an existing member's fields and relations, then re-read it.
    pub async fn save_member(&self, details: MemberDetails) -> Result<Saved<MemberDetails>, AccessError> {
        let id = details.id.ok_or(AccessError::Unsaved { kind: EntityKind::Member })?;
        details.validate()?;
        let patch = Self::payload::<Member>(&details.info)?;
        self.reconcile_member(id, &details, Some(patch)).await
    }

    /// Delete a member. Returns its last fields with empty relation lists.
    pub async fn remove_member(&self, id: EntityId) -> Result<MemberDetails, AccessError> {
        let info = self.delete_record::<Member>(id).await?;
        Ok(MemberDetails {
            id: Some(id),
            info,
            roles: Vec::new(),
            keys: Vec::new(),
        })
    }

    async fn reconcile_member(
        &self,
        id: EntityId,
        details: &MemberDetails,
        patch: Option<Value>,
    ) -> Result<Saved<MemberDetails>, AccessError> {
        let (held, keys) = tokio::try_join!(
            self.related_records::<Role>(Link::MemberRoles, id),
            self.list_records::<Key>()
        )?;
        let owned: Vec<EntityId> = keys
            .iter()
            .filter(|k| k.member_id == Some(id))
            .map(|k| k.id)
            .collect();

        let mut writes = Vec::new();
        if let Some(patch) = patch {
            writes.push(Write::Update { kind: EntityKind::Member, id, patch });
        }
        let roles = RelationDiff::compute(&details.roles, &ids(&held))?;
        writes.extend(Write::relation_writes(Link::MemberRoles, id, &roles));

        let keys = RelationDiff::compute(&details.keys, &owned)?;
        writes.extend(keys.assign.iter().map(|&key_id| Write::Owner { key_id, member_id: Some(id) }));
        writes.extend(keys.revoke.iter().map(|&key_id| Write::Owner { key_id, member_id: None }));

        let failures = self.dispatch(writes).await;
        let details = self.member_details(id).await?;
        Ok(Saved { details, failures })
    }
}
