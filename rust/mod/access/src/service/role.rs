use serde_json::Value;

use gatehouse_store::{EntityId, EntityKind, Link};

use crate::details::RoleDetails;
use crate::error::AccessError;
use crate::field::{blank_fields, to_fields};
use crate::model::{Door, Entity, Member, Role};
use crate::relation::{RelationDiff, merge};
use crate::service::{AccessService, Saved, Write, ids};

impl AccessService {
    /// List all roles as `{id, name}`.
    pub async fn list_roles(&self) -> Result<Vec<Entity>, AccessError> {
        self.summaries::<Role>().await
    }

    /// Get RoleDetails by id. Reads the role, both candidate catalogs and
    /// both association lists concurrently.
    pub async fn role_details(&self, id: EntityId) -> Result<RoleDetails, AccessError> {
        let (role, doors, opened, members, people) = tokio::try_join!(
            self.get_record::<Role>(id),
            self.list_records::<Door>(),
            self.related_records::<Door>(Link::RoleDoors, id),
            self.list_records::<Member>(),
            self.related_records::<Member>(Link::RoleMembers, id)
        )?;

        Ok(RoleDetails {
            id: Some(role.id),
            info: to_fields(&role),
            doors: merge(Some(id), &doors, &opened),
            people: merge(Some(id), &members, &people),
        })
    }

    /// A placeholder role that does not exist on the backend yet.
    pub async fn empty_role_details(&self) -> Result<RoleDetails, AccessError> {
        let (doors, members) = tokio::try_join!(
            self.list_records::<Door>(),
            self.list_records::<Member>()
        )?;
        Ok(RoleDetails {
            id: None,
            info: blank_fields::<Role>(),
            doors: merge(None, &doors, &[]),
            people: merge(None, &members, &[]),
        })
    }

    /// Create a role, then link its selected doors and people.
    ///
    /// Fails with `AlreadyExists` if `details.id` is set.
    pub async fn create_role(&self, mut details: RoleDetails) -> Result<Saved<RoleDetails>, AccessError> {
        details.validate()?;
        let id = self.insert_record::<Role>(details.id, &mut details.info).await?;
        details.id = Some(id);
        self.reconcile_role(id, &details, None)
            .await
            .map_err(|e| AccessError::created(EntityKind::Role, id, e))
    }

    /// Save an existing role's name, doors and people, then re-read it.
    pub async fn save_role(&self, details: RoleDetails) -> Result<Saved<RoleDetails>, AccessError> {
        let id = details.id.ok_or(AccessError::Unsaved { kind: EntityKind::Role })?;
        details.validate()?;
        let patch = Self::payload::<Role>(&details.info)?;
        self.reconcile_role(id, &details, Some(patch)).await
    }

    /// Delete a role. Returns its last fields with empty relation lists.
    pub async fn remove_role(&self, id: EntityId) -> Result<RoleDetails, AccessError> {
        let info = self.delete_record::<Role>(id).await?;
        Ok(RoleDetails {
            id: Some(id),
            info,
            doors: Vec::new(),
            people: Vec::new(),
        })
    }

    async fn reconcile_role(
        &self,
        id: EntityId,
        details: &RoleDetails,
        patch: Option<Value>,
    ) -> Result<Saved<RoleDetails>, AccessError> {
        let (opened, people) = tokio::try_join!(
            self.related_records::<Door>(Link::RoleDoors, id),
            self.related_records::<Member>(Link::RoleMembers, id)
        )?;

        let mut writes = Vec::new();
        if let Some(patch) = patch {
            writes.push(Write::Update { kind: EntityKind::Role, id, patch });
        }
        let doors = RelationDiff::compute(&details.doors, &ids(&opened))?;
        writes.extend(Write::relation_writes(Link::RoleDoors, id, &doors));
        let members = RelationDiff::compute(&details.people, &ids(&people))?;
        writes.extend(Write::relation_writes(Link::RoleMembers, id, &members));

        let failures = self.dispatch(writes).await;
        let details = self.role_details(id).await?;
        Ok(Saved { details, failures })
    }
}
