//! Crate-wide error type.
//!
//! Store failures (`rusqlite`) propagate unchanged through `?`; the lineage
//! engine itself only adds the cancellation variants.

use thiserror::Error;

/// Every fallible operation in famgraph returns this error.
#[derive(Debug, Error)]
pub enum FamGraphError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A record addressed by id does not exist (or is soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Caller-supplied data failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A write would break a referential or structural rule of the family graph.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("traversal cancelled")]
    Cancelled,

    #[error("traversal deadline exceeded")]
    DeadlineExceeded,
}

impl FamGraphError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }

    /// True for errors caused by the caller rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidInput(_) | Self::Integrity(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FamGraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = FamGraphError::not_found("person", "person_abc");
        assert_eq!(err.to_string(), "person not found: person_abc");
        assert!(err.is_client_error());
    }

    #[test]
    fn sqlite_errors_convert_and_are_not_client_errors() {
        let err: FamGraphError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, FamGraphError::Sqlite(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn cancellation_variants_render() {
        assert_eq!(FamGraphError::Cancelled.to_string(), "traversal cancelled");
        assert_eq!(
            FamGraphError::DeadlineExceeded.to_string(),
            "traversal deadline exceeded"
        );
    }
}
