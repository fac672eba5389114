//! sqlx error mapping shared by the PostgreSQL and MariaDB backends.
//!
//! Maps `sqlx::Error` to `RepositoryError`. The driver message is logged and
//! kept out of the returned error's display text.

use inviteazy_core::storage::RepositoryError;

/// Maps a sqlx error to a RepositoryError.
///
/// # Error Mapping
///
/// - Unique constraint violation → `RepositoryError::AlreadyExists`
/// - Pool exhaustion, I/O and TLS failures → `RepositoryError::ConnectionFailed`
/// - Column decode failures → `RepositoryError::InvalidData`
/// - All other errors → `RepositoryError::StoreOperation`
pub fn map_sqlx_error(
    err: sqlx::Error,
    entity_type: &'static str,
    id: Option<&str>,
    description: impl Into<String>,
) -> RepositoryError {
    let description = description.into();
    tracing::error!(entity = entity_type, error = %err, "{description}");

    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id.unwrap_or("unknown").to_string(),
            }
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => RepositoryError::ConnectionFailed(description),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            RepositoryError::InvalidData(description)
        }
        _ => RepositoryError::store_operation(description, &err),
    }
}

/// Maps a column read failure while converting a row.
///
/// The driver message is logged; the returned error names only the entity.
pub fn map_column_error(err: sqlx::Error, entity_type: &'static str) -> RepositoryError {
    tracing::error!(entity = entity_type, error = %err, "Failed to decode row");
    RepositoryError::InvalidData(format!("{entity_type} row could not be decoded"))
}
