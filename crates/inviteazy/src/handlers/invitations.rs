//! Invitation handlers.
//!
//! `GET /api/v1/invitations` and `GET /api/v1/invitations/{id}` go through
//! the response cache.

use axum::{
    extract::{OriginalUri, Path, State},
    http::Method,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use inviteazy_core::invitation::{Invitee, InviteePatch, InviteeStatus, ValidationError};

use super::{events::request_path, response::ApiResponse, AppError};
use crate::{cache::CachedResponse, state::AppState};

/// Body of `PATCH /api/v1/invitations/{id}/status`.
///
/// The status is kept as a string here so that an unknown value is reported
/// as a validation error.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Body of `PUT /api/v1/invitations/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInvitationRequest {
    #[serde(default)]
    pub event_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub is_checked_in: Option<bool>,
    #[serde(default)]
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl UpdateInvitationRequest {
    pub fn into_patch(self) -> Result<InviteePatch, ValidationError> {
        Ok(InviteePatch {
            event_id: self.event_id,
            user_id: self.user_id,
            status: parse_status(self.status)?,
            qr_code: self.qr_code,
            is_checked_in: self.is_checked_in,
            checked_in_at: self.checked_in_at,
        })
    }
}

/// Parses an optional status from a request body.
pub(super) fn parse_status(
    status: Option<String>,
) -> Result<Option<InviteeStatus>, ValidationError> {
    status.map(|value| value.parse()).transpose()
}

/// List all invitations (GET /api/v1/invitations).
pub async fn list_invitations(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Result<CachedResponse, AppError> {
    let services = &state.services;
    state
        .response_cache
        .get_or_fetch(method.as_str(), &request_path(&uri), || async move {
            let invitees = services.invitees.list().await?;
            Ok::<_, AppError>(ApiResponse::success(invitees))
        })
        .await
}

/// List the invitations of a user (GET /api/v1/invitations/user/{user_id}).
pub async fn list_user_invitations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Invitee>>>, AppError> {
    let invitees = state.services.invitees.list_by_user(user_id).await?;
    Ok(Json(ApiResponse::success(invitees)))
}

/// Get a single invitation by ID (GET /api/v1/invitations/{id}).
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Result<CachedResponse, AppError> {
    let services = &state.services;
    state
        .response_cache
        .get_or_fetch(method.as_str(), &request_path(&uri), || async move {
            let invitee = services
                .invitees
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Invitee", id))?;
            Ok::<_, AppError>(ApiResponse::success(invitee))
        })
        .await
}

/// Update an invitation by ID (PUT /api/v1/invitations/{id}).
pub async fn update_invitation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvitationRequest>,
) -> Result<Json<ApiResponse<Invitee>>, AppError> {
    let patch = payload.into_patch()?;
    let invitee = state
        .services
        .invitees
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Invitee", id))?;
    state.response_cache.invalidate_invitations().await;
    Ok(Json(ApiResponse::success(invitee)))
}

/// Delete an invitation by ID (DELETE /api/v1/invitations/{id}).
pub async fn delete_invitation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.services.invitees.delete(id).await?;
    state.response_cache.invalidate_invitations().await;
    Ok(Json(ApiResponse::message("Invitee deleted successfully")))
}

/// Set the RSVP status (PATCH /api/v1/invitations/{id}/status).
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<ApiResponse<Invitee>>, AppError> {
    let status: InviteeStatus = payload.status.parse()?;
    let invitee = state.services.invitees.update_status(id, status).await?;
    state.response_cache.invalidate_invitations().await;
    Ok(Json(ApiResponse::success(invitee)))
}

/// Mark an invitee as present (POST /api/v1/invitations/{id}/check-in).
pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Invitee>>, AppError> {
    let invitee = state.services.invitees.check_in(id).await?;
    state.response_cache.invalidate_invitations().await;
    Ok(Json(ApiResponse::success(invitee)))
}
