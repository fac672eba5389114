use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inviteazy_core::invitation::ValidationError;
use inviteazy_core::storage::{repository_error_to_status_code, RepositoryError};

use super::response::ApiResponse;

/// Handler error that wraps `anyhow::Error`.
///
/// The status code is picked by downcasting to the domain error types;
/// anything else, configuration errors included, is a 500. The body is
/// always `{"status":"error","message":...}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self(RepositoryError::not_found(entity_type, id).into())
    }

    fn status_code(&self) -> StatusCode {
        if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            let code = repository_error_to_status_code(repo_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else if self.0.downcast_ref::<ValidationError>().is_some() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        match self.0.downcast_ref::<RepositoryError>() {
            Some(RepositoryError::StoreOperation {
                description,
                reason,
            }) => tracing::error!(%description, %reason, "Store operation failed"),
            _ if status_code.is_server_error() => {
                tracing::error!(error = %self.0, "Application error")
            }
            _ => tracing::debug!(status = %status_code, error = %self.0, "Request failed"),
        }

        (status_code, Json(ApiResponse::error(self.0.to_string()))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
