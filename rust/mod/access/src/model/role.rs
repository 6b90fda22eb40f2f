use serde::{Deserialize, Serialize};

use gatehouse_store::{EntityId, EntityKind};

use crate::error::AccessError;
use crate::field::{FieldMap, FieldSpec, FieldValue, Project};
use crate::model::Resource;

/// A named set of door permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: EntityId,
    pub name: String,
}

/// Writable attributes of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePayload {
    pub name: String,
}

impl Resource for Role {
    const KIND: EntityKind = EntityKind::Role;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Project for Role {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { id: "id", name: "ID", editable: false },
        FieldSpec { id: "name", name: "Name", editable: true },
    ];
    const NAME_FIELD: &'static str = "name";

    type Payload = RolePayload;

    fn values(&self) -> Vec<FieldValue> {
        vec![FieldValue::Int(self.id), self.name.clone().into()]
    }

    fn blank_values() -> Vec<FieldValue> {
        vec![FieldValue::Null, "".into()]
    }

    fn payload(fields: &FieldMap<'_>) -> Result<RolePayload, AccessError> {
        Ok(RolePayload {
            name: fields.text("name")?,
        })
    }
}
