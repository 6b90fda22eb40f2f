use std::fmt;

use thiserror::Error;

use gatehouse_store::{EntityId, EntityKind, StoreError};

use crate::service::Write;

/// Access layer error type.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("unable to find {kind} with id={id}")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("{kind} with id={id} already exists")]
    AlreadyExists { kind: EntityKind, id: EntityId },

    #[error("{kind} has no id yet; create it before saving")]
    Unsaved { kind: EntityKind },

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    #[error("field '{field}' must be {expected}")]
    InvalidField { field: String, expected: &'static str },

    #[error("invalid: {0}")]
    Invalid(String),

    #[error(transparent)]
    Writes(WriteFailures),

    /// The record was inserted, but a later step of the create failed.
    #[error("{kind} created with id={id}, but reading it back failed: {source}")]
    Created {
        kind: EntityKind,
        id: EntityId,
        source: Box<AccessError>,
    },

    #[error("store: {0}")]
    Store(StoreError),
}

impl AccessError {
    pub(crate) fn created(kind: EntityKind, id: EntityId, source: AccessError) -> Self {
        AccessError::Created { kind, id, source: Box::new(source) }
    }

    /// Id of a record that exists even though the call failed.
    pub fn created_id(&self) -> Option<EntityId> {
        match self {
            AccessError::Created { id, .. } => Some(*id),
            _ => None,
        }
    }
}

impl From<StoreError> for AccessError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => AccessError::NotFound { kind, id },
            StoreError::Conflict { kind, id } => AccessError::AlreadyExists { kind, id },
            other => AccessError::Store(other),
        }
    }
}

/// One write of a fan-out that the store rejected.
#[derive(Debug)]
pub struct WriteFailure {
    pub write: Write,
    pub error: AccessError,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.write, self.error)
    }
}

/// Every failed write of one save, in dispatch order.
#[derive(Debug)]
pub struct WriteFailures(pub Vec<WriteFailure>);

impl std::error::Error for WriteFailures {}

impl fmt::Display for WriteFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} writes failed", self.0.len())?;
        for failure in &self.0 {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_access_conditions() {
        let e: AccessError = StoreError::NotFound { kind: EntityKind::Key, id: 3 }.into();
        assert!(matches!(e, AccessError::NotFound { kind: EntityKind::Key, id: 3 }));
        assert_eq!(e.to_string(), "unable to find key with id=3");

        let e: AccessError = StoreError::Conflict { kind: EntityKind::Role, id: 1 }.into();
        assert!(matches!(e, AccessError::AlreadyExists { .. }));

        let e: AccessError = StoreError::Server { status: 500, message: "down".into() }.into();
        assert_eq!(e.to_string(), "store: HTTP 500: down");
    }

    #[test]
    fn aggregate_lists_each_failure() {
        let failures = WriteFailures(vec![
            WriteFailure {
                write: Write::Link { link: gatehouse_store::Link::MemberRoles, owner_id: 1, target_id: 2 },
                error: AccessError::NotFound { kind: EntityKind::Role, id: 2 },
            },
            WriteFailure {
                write: Write::Owner { key_id: 4, member_id: None },
                error: AccessError::NotFound { kind: EntityKind::Key, id: 4 },
            },
        ]);
        assert_eq!(
            failures.to_string(),
            "2 writes failed; link member roles 1 -> 2: unable to find role with id=2; \
             release key 4: unable to find key with id=4"
        );
    }
}
