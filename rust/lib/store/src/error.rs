use thiserror::Error;

use crate::traits::{EntityId, EntityKind};

/// Stable error code constants.
///
/// Callers match on these, never on the human-readable message.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const NETWORK: &str = "NETWORK";
    pub const DECODE: &str = "DECODE";
}

/// Error returned by every [`EntityStore`](crate::EntityStore) operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist. HTTP 404.
    #[error("{kind} with id={id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// The record already exists. HTTP 409.
    #[error("{kind} with id={id} already exists")]
    Conflict { kind: EntityKind, id: EntityId },

    /// Any other non-success response from the backend.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),
}

impl StoreError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => error_code::NOT_FOUND,
            StoreError::Conflict { .. } => error_code::ALREADY_EXISTS,
            StoreError::Server { .. } => error_code::SERVER_ERROR,
            StoreError::Network(_) => error_code::NETWORK,
            StoreError::Decode(_) => error_code::DECODE,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_mapping() {
        let nf = StoreError::NotFound { kind: EntityKind::Key, id: 3 };
        assert_eq!(nf.error_code(), "NOT_FOUND");
        assert!(nf.is_not_found());

        let dup = StoreError::Conflict { kind: EntityKind::Member, id: 1 };
        assert_eq!(dup.error_code(), "ALREADY_EXISTS");
        assert!(!dup.is_not_found());

        let srv = StoreError::Server { status: 500, message: "boom".into() };
        assert_eq!(srv.error_code(), "SERVER_ERROR");
        assert_eq!(StoreError::Decode("x".into()).error_code(), "DECODE");
    }

    #[test]
    fn messages_name_kind_and_id() {
        let nf = StoreError::NotFound { kind: EntityKind::Role, id: 12 };
        assert_eq!(nf.to_string(), "role with id=12 not found");

        let srv = StoreError::Server { status: 502, message: "bad gateway".into() };
        assert_eq!(srv.to_string(), "HTTP 502: bad gateway");
    }
}
