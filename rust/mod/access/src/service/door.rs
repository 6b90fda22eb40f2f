use serde_json::Value;

use gatehouse_store::{EntityId, EntityKind, Link};

use crate::details::DoorDetails;
use crate::error::AccessError;
use crate::field::{blank_fields, to_fields};
use crate::model::{Door, Entity, Role};
use crate::relation::{RelationDiff, merge};
use crate::service::{AccessService, Saved, Write, ids};

impl AccessService {
    /// List all doors as `{id, name}`.
    pub async fn list_doors(&self) -> Result<Vec<Entity>, AccessError> {
        self.summaries::<Door>().await
    }

    /// Get DoorDetails by id.
    pub async fn door_details(&self, id: EntityId) -> Result<DoorDetails, AccessError> {
        let (door, roles, granting) = tokio::try_join!(
            self.get_record::<Door>(id),
            self.list_records::<Role>(),
            self.related_records::<Role>(Link::DoorRoles, id)
        )?;
        Ok(DoorDetails {
            id: Some(door.id),
            info: to_fields(&door),
            roles: merge(Some(id), &roles, &granting),
        })
    }

    pub async fn empty_door_details(&self) -> Result<DoorDetails, AccessError> {
        let roles = self.list_records::<Role>().await?;
        Ok(DoorDetails {
            id: None,
            info: blank_fields::<Door>(),
            roles: merge(None, &roles, &[]),
        })
    }

    /// Create a door, then link the selected roles to it.
    pub async fn create_door(&self, mut details: DoorDetails) -> Result<Saved<DoorDetails>, AccessError> {
        details.validate()?;
        let id = self.insert_record::<Door>(details.id, &mut details.info).await?;
        details.id = Some(id);
        self.reconcile_door(id, &details, None)
            .await
            .map_err(|e| AccessError::created(EntityKind::Door, id, e))
    }

    pub async fn save_door(&self, details: DoorDetails) -> Result<Saved<DoorDetails>, AccessError> {
        let id = details.id.ok_or(AccessError::Unsaved { kind: EntityKind::Door })?;
        details.validate()?;
        let patch = Self::payload::<Door>(&details.info)?;
        self.reconcile_door(id, &details, Some(patch)).await
    }

    pub async fn remove_door(&self, id: EntityId) -> Result<DoorDetails, AccessError> {
        let info = self.delete_record::<Door>(id).await?;
        Ok(DoorDetails {
            id: Some(id),
            info,
            roles: Vec::new(),
        })
    }

    async fn reconcile_door(
        &self,
        id: EntityId,
        details: &DoorDetails,
        patch: Option<Value>,
    ) -> Result<Saved<DoorDetails>, AccessError> {
        let granting = self.related_records::<Role>(Link::DoorRoles, id).await?;

        let mut writes = Vec::new();
        if let Some(patch) = patch {
            writes.push(Write::Update { kind: EntityKind::Door, id, patch });
        }
        let roles = RelationDiff::compute(&details.roles, &ids(&granting))?;
        writes.extend(Write::relation_writes(Link::DoorRoles, id, &roles));

        let failures = self.dispatch(writes).await;
        let details = self.door_details(id).await?;
        Ok(Saved { details, failures })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gatehouse_store::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn door_roles_mirror_role_doors() {
        let svc = AccessService::new(Arc::new(MemoryStore::demo()));
        let mut door = svc.door_details(2).await.unwrap();
        let granting: Vec<EntityId> = door.roles.iter().filter(|r| r.selected).map(|r| r.id).collect();
        assert_eq!(granting, vec![2, 4]);

        for role in door.roles.iter_mut() {
            role.selected = role.id == 5;
        }
        svc.save_door(door).await.unwrap().into_result().unwrap();

        let visitor = svc.role_details(5).await.unwrap();
        let doors: Vec<EntityId> = visitor.doors.iter().filter(|d| d.selected).map(|d| d.id).collect();
        assert_eq!(doors, vec![1, 2]);
        let owner = svc.role_details(4).await.unwrap();
        assert!(owner.doors.iter().any(|d| d.id == 2 && !d.selected));
    }
}
