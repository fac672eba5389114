//! MongoDB error mapping.

use mongodb::error::{Error, ErrorKind, WriteFailure};

use inviteazy_core::storage::RepositoryError;

/// Server code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Returns true when the error is a unique index violation.
///
/// Inserts report it as a write error; `findAndModify` reports it as a
/// command error.
pub fn is_duplicate_key(err: &Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// Maps a MongoDB driver error to a RepositoryError.
///
/// # Error Mapping
///
/// - Duplicate key → `RepositoryError::AlreadyExists`
/// - Server selection, I/O and pool failures → `RepositoryError::ConnectionFailed`
/// - BSON decode failures → `RepositoryError::InvalidData`
/// - All other errors → `RepositoryError::StoreOperation`
pub fn map_mongo_error(
    err: Error,
    entity_type: &'static str,
    id: Option<&str>,
    description: impl Into<String>,
) -> RepositoryError {
    let description = description.into();
    tracing::error!(entity = entity_type, error = %err, "{description}");

    if is_duplicate_key(&err) {
        return RepositoryError::AlreadyExists {
            entity_type,
            id: id.unwrap_or("unknown").to_string(),
        };
    }

    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => RepositoryError::ConnectionFailed(description),
        ErrorKind::BsonDeserialization(_) => RepositoryError::InvalidData(description),
        _ => RepositoryError::store_operation(description, &err),
    }
}
