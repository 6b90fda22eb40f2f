use serde::{Deserialize, Serialize};

use gatehouse_store::{EntityId, EntityKind};

use crate::error::AccessError;
use crate::field::{FieldMap, FieldSpec, FieldValue, Project};
use crate::model::Resource;

/// A controlled entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub id: EntityId,
    pub name: String,
}

/// Writable attributes of a door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorPayload {
    pub name: String,
}

impl Resource for Door {
    const KIND: EntityKind = EntityKind::Door;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Project for Door {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { id: "id", name: "ID", editable: false },
        FieldSpec { id: "name", name: "Name", editable: true },
    ];
    const NAME_FIELD: &'static str = "name";

    type Payload = DoorPayload;

    fn values(&self) -> Vec<FieldValue> {
        vec![FieldValue::Int(self.id), self.name.clone().into()]
    }

    fn blank_values() -> Vec<FieldValue> {
        vec![FieldValue::Null, "".into()]
    }

    fn payload(fields: &FieldMap<'_>) -> Result<DoorPayload, AccessError> {
        Ok(DoorPayload {
            name: fields.text("name")?,
        })
    }
}
