//! User CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use inviteazy_core::invitation::{NewUser, User, UserPatch};

use super::{response::ApiResponse, AppError};
use crate::state::AppState;

/// List all users (GET /api/users).
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    let users = state.services.users.list().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// Create a new user (POST /api/users).
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.services.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// Get a single user by ID (GET /api/users/{id}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state
        .services
        .users
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    Ok(Json(ApiResponse::success(user)))
}

/// Update a user by ID (PUT /api/users/{id}).
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state
        .services
        .users
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    Ok(Json(ApiResponse::success(user)))
}

/// Delete a user by ID (DELETE /api/users/{id}).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.services.users.delete(id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}
