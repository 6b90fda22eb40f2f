use serde::{Deserialize, Serialize};

use gatehouse_store::{EntityId, EntityKind};

use crate::error::AccessError;
use crate::field::{FieldMap, FieldSpec, FieldValue, Project};
use crate::model::Resource;

/// A physical credential (card, fob) identified by its `uuid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: EntityId,
    pub uuid: String,

    /// Owning member. A key has at most one owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<EntityId>,
}

/// Writable attributes of a key.
///
/// Ownership is not part of the payload: `member_id` only changes through
/// the key/member relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPayload {
    pub uuid: String,
}

impl Resource for Key {
    const KIND: EntityKind = EntityKind::Key;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.uuid
    }

    fn owner(&self) -> Option<EntityId> {
        self.member_id
    }
}

impl Project for Key {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { id: "id", name: "ID", editable: false },
        FieldSpec { id: "uuid", name: "UUID", editable: true },
        FieldSpec { id: "member_id", name: "Member ID", editable: false },
    ];
    const NAME_FIELD: &'static str = "uuid";

    type Payload = KeyPayload;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int(self.id),
            self.uuid.clone().into(),
            self.member_id.into(),
        ]
    }

    fn blank_values() -> Vec<FieldValue> {
        vec![FieldValue::Null, "".into(), FieldValue::Null]
    }

    fn payload(fields: &FieldMap<'_>) -> Result<KeyPayload, AccessError> {
        Ok(KeyPayload {
            uuid: fields.text("uuid")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::to_fields;

    #[test]
    fn member_id_is_projected_but_never_written() {
        let key = Key { id: 4, uuid: "0xa092a0".into(), member_id: Some(1) };
        let fields = to_fields(&key);
        assert_eq!(fields[2].id, "member_id");
        assert_eq!(fields[2].value, FieldValue::Int(1));
        assert!(!fields[2].editable);

        let payload = Key::payload(&FieldMap::new(&fields).unwrap()).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"uuid": "0xa092a0"})
        );
    }

    #[test]
    fn unowned_key_decodes() {
        let key: Key = serde_json::from_str(r#"{"id": 2, "uuid": "0x543210"}"#).unwrap();
        assert_eq!(key.member_id, None);
        assert_eq!(key.owner(), None);
        assert_eq!(key.label(), "0x543210");
    }
}
