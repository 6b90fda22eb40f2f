use serde::{Deserialize, Serialize};

use gatehouse_store::{EntityId, EntityKind};

use crate::error::AccessError;
use crate::field::{FieldMap, FieldSpec, FieldValue, Project};
use crate::model::Resource;

/// A person registered with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: EntityId,
    pub name: String,
}

/// Writable attributes of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPayload {
    pub name: String,
}

impl Resource for Member {
    const KIND: EntityKind = EntityKind::Member;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Project for Member {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { id: "id", name: "ID", editable: false },
        FieldSpec { id: "name", name: "Name", editable: true },
    ];
    const NAME_FIELD: &'static str = "name";

    type Payload = MemberPayload;

    fn values(&self) -> Vec<FieldValue> {
        vec![FieldValue::Int(self.id), self.name.clone().into()]
    }

    fn blank_values() -> Vec<FieldValue> {
        vec![FieldValue::Null, "".into()]
    }

    fn payload(fields: &FieldMap<'_>) -> Result<MemberPayload, AccessError> {
        Ok(MemberPayload {
            name: fields.text("name")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{blank_fields, to_fields};

    #[test]
    fn fields_round_trip_to_payload() {
        let member = Member { id: 3, name: "Paul McCartney".into() };
        let fields = to_fields(&member);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].id, "id");
        assert!(!fields[0].editable);
        assert_eq!(fields[0].value, FieldValue::Int(3));

        let payload = Member::payload(&FieldMap::new(&fields).unwrap()).unwrap();
        assert_eq!(payload.name, member.name);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"name": "Paul McCartney"})
        );
    }

    #[test]
    fn blank_member_has_null_identity() {
        let fields = blank_fields::<Member>();
        assert_eq!(fields[0].value, FieldValue::Null);
        assert_eq!(fields[1].value, FieldValue::Text(String::new()));
    }
}
