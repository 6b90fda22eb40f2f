//! Field projection: raw records to ordered, typed, editable fields and back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use gatehouse_store::EntityId;

use crate::error::AccessError;
use crate::model::Resource;

/// Scalar value of a [`Field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Option<EntityId>> for FieldValue {
    fn from(id: Option<EntityId>) -> Self {
        id.map_or(FieldValue::Null, FieldValue::Int)
    }
}

/// A single attribute of a Details aggregate. For example, `id` or `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Lookup key, unique within one aggregate. e.g. `id` or `uuid`.
    pub id: String,

    /// Human-readable label. e.g. "ID" or "UUID".
    pub name: String,

    pub value: FieldValue,

    /// Can the UI edit this field?
    pub editable: bool,
}

/// Static description of one projected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub editable: bool,
}

/// Projection of a raw record into fields, and of edited fields into the
/// record's typed write payload.
///
/// `FIELDS` fixes order and editability; `values()` and `blank_values()`
/// return one value per spec, in the same order. The identity field is
/// always first and never editable.
pub trait Project: Resource {
    const FIELDS: &'static [FieldSpec];

    /// Field holding the record's display name in list views.
    const NAME_FIELD: &'static str;

    /// Body of create/update requests. Carries editable attributes only.
    type Payload: Serialize + Send + Sync;

    fn values(&self) -> Vec<FieldValue>;

    /// Values of a record that does not exist yet.
    fn blank_values() -> Vec<FieldValue>;

    /// Build the write payload from edited fields.
    fn payload(fields: &FieldMap<'_>) -> Result<Self::Payload, AccessError>;
}

/// Project a record into its fields.
pub fn to_fields<T: Project>(record: &T) -> Vec<Field> {
    project(T::FIELDS, record.values())
}

/// Fields of a not-yet-created record.
pub fn blank_fields<T: Project>() -> Vec<Field> {
    project(T::FIELDS, T::blank_values())
}

fn project(specs: &[FieldSpec], values: Vec<FieldValue>) -> Vec<Field> {
    specs
        .iter()
        .zip(values)
        .map(|(spec, value)| Field {
            id: spec.id.to_string(),
            name: spec.name.to_string(),
            value,
            editable: spec.editable,
        })
        .collect()
}

/// Copy a backend-assigned id into the `id` field.
pub(crate) fn assign_id(info: &mut [Field], id: EntityId) -> Result<(), AccessError> {
    let field = info
        .iter_mut()
        .find(|f| f.id == "id")
        .ok_or_else(|| AccessError::MissingField("id".into()))?;
    field.value = FieldValue::Int(id);
    Ok(())
}

/// Typed lookup over one aggregate's fields, keyed by field id.
///
/// Built once per aggregate. A missing key is an error, never a silent
/// default.
#[derive(Debug)]
pub struct FieldMap<'a> {
    by_id: HashMap<&'a str, &'a Field>,
}

impl<'a> FieldMap<'a> {
    pub fn new(fields: &'a [Field]) -> Result<Self, AccessError> {
        let mut by_id = HashMap::with_capacity(fields.len());
        for field in fields {
            if by_id.insert(field.id.as_str(), field).is_some() {
                return Err(AccessError::DuplicateField(field.id.clone()));
            }
        }
        Ok(Self { by_id })
    }

    pub fn get(&self, id: &str) -> Result<&'a Field, AccessError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| AccessError::MissingField(id.to_string()))
    }

    /// Text value of a field.
    pub fn text(&self, id: &str) -> Result<String, AccessError> {
        match &self.get(id)?.value {
            FieldValue::Text(s) => Ok(s.clone()),
            _ => Err(AccessError::InvalidField {
                field: id.to_string(),
                expected: "text",
            }),
        }
    }

    /// Integer value of a field; `null` reads as `None`.
    pub fn optional_int(&self, id: &str) -> Result<Option<i64>, AccessError> {
        match &self.get(id)?.value {
            FieldValue::Int(n) => Ok(Some(*n)),
            FieldValue::Null => Ok(None),
            _ => Err(AccessError::InvalidField {
                field: id.to_string(),
                expected: "an integer or null",
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
