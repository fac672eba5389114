//! Pure functions for mapping repository errors to HTTP status codes.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `AlreadyExists` -> 409 (Conflict)
/// - `Validation` -> 400 (Bad Request)
/// - `ConnectionFailed` -> 503 (Service Unavailable)
/// - `StoreOperation` -> 500 (Internal Server Error)
/// - `InvalidData` -> 500 (Internal Server Error)
/// - `Unimplemented` -> 501 (Not Implemented)
///
/// # Examples
///
/// ```
/// use inviteazy_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::not_found("Invitee", "abc-123");
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::Validation(_) => 400,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::StoreOperation { .. } => 500,
        // Stored data the domain cannot represent is a server-side problem.
        RepositoryError::InvalidData(_) => 500,
        RepositoryError::Unimplemented { .. } => 501,
    }
}
