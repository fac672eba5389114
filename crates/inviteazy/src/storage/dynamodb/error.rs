//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `inviteazy_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;

use inviteazy_core::storage::RepositoryError;

/// Cancellation reason code for a failed condition inside a transaction.
pub const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailed";

/// Maps any SDK operation error to a RepositoryError.
///
/// Dispatch and timeout failures mean the service was not reached and map to
/// `ConnectionFailed`. Service errors map to `StoreOperation` with the error
/// code as the reason.
pub fn map_sdk_error<E, R>(
    err: SdkError<E, R>,
    entity_type: &'static str,
    description: impl Into<String>,
) -> RepositoryError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug,
{
    let description = description.into();
    tracing::error!(
        entity = entity_type,
        error = %DisplayErrorContext(&err),
        "{description}"
    );

    if matches!(err, SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)) {
        return RepositoryError::ConnectionFailed(description);
    }

    let reason = match err.code() {
        Some("ProvisionedThroughputExceededException")
        | Some("RequestLimitExceeded")
        | Some("ThrottlingException") => "Throughput exceeded, please retry",
        Some("ResourceNotFoundException") => "Table not found",
        Some("TransactionConflictException") => "Transaction conflict, please retry",
        Some("InternalServerError") => "DynamoDB internal server error",
        Some(code) => code,
        None => "unknown DynamoDB error",
    };
    RepositoryError::store_operation(description, reason)
}

/// Maps a request builder error.
pub fn map_build_error(err: BuildError, description: impl Into<String>) -> RepositoryError {
    RepositoryError::store_operation(description, err)
}

/// Returns true when an UpdateItem was rejected by its condition expression.
pub fn is_conditional_check_failed<R>(err: &SdkError<UpdateItemError, R>) -> bool {
    matches!(
        err.as_service_error(),
        Some(UpdateItemError::ConditionalCheckFailedException(_))
    )
}

/// Returns the indexes of transaction items whose condition failed.
///
/// Empty when the error is not a transaction cancellation.
pub fn failed_conditions<R>(err: &SdkError<TransactWriteItemsError, R>) -> Vec<usize> {
    match err.as_service_error() {
        Some(TransactWriteItemsError::TransactionCanceledException(cancelled)) => cancelled
            .cancellation_reasons()
            .iter()
            .enumerate()
            .filter(|(_, reason)| reason.code() == Some(CONDITIONAL_CHECK_FAILED))
            .map(|(index, _)| index)
            .collect(),
        _ => Vec::new(),
    }
}

/// Map a connection or configuration error to RepositoryError.
pub fn map_connection_error(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::ConnectionFailed(err.to_string())
}
