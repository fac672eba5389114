use thiserror::Error;

use crate::invitation::ValidationError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// A query or write against the store failed.
    ///
    /// Only `description` is displayed. `reason` keeps the driver message for
    /// logging and must not be sent to clients.
    #[error("{description}")]
    StoreOperation { description: String, reason: String },
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity_type} repository is not implemented for the {backend} backend")]
    Unimplemented {
        entity_type: &'static str,
        backend: &'static str,
    },
}

impl RepositoryError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn store_operation(description: impl Into<String>, reason: impl ToString) -> Self {
        Self::StoreOperation {
            description: description.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::not_found("Invitee", "abc-123");
        assert_eq!(error.to_string(), "Invitee not found: abc-123");
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "User",
            id: "ana@example.com".to_string(),
        };
        assert_eq!(error.to_string(), "User already exists: ana@example.com");
    }

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 30s");
    }

    #[test]
    fn test_store_operation_hides_reason() {
        let error = RepositoryError::store_operation(
            "failed to update invitee with ID 42",
            "ER_LOCK_DEADLOCK: Deadlock found when trying to get lock",
        );
        assert_eq!(error.to_string(), "failed to update invitee with ID 42");
        assert!(!error.to_string().contains("Deadlock"));
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let error: RepositoryError = ValidationError::InvalidStatus("yes".to_string()).into();
        assert_eq!(
            error.to_string(),
            ValidationError::InvalidStatus("yes".to_string()).to_string()
        );
    }

    #[test]
    fn test_unimplemented_display() {
        let error = RepositoryError::Unimplemented {
            entity_type: "Event",
            backend: "mongodb",
        };
        assert_eq!(
            error.to_string(),
            "Event repository is not implemented for the mongodb backend"
        );
    }

    #[test]
    fn test_repository_error_invalid_data_display() {
        let error = RepositoryError::InvalidData("unknown status 'yes'".to_string());
        assert_eq!(error.to_string(), "Invalid data: unknown status 'yes'");
    }
}
