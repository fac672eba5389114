//! Event handlers, including invitations and guest insights scoped to one
//! event.
//!
//! `GET /api/v1/events` and `GET /api/v1/events/{id}` go through the
//! response cache.

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use inviteazy_core::invitation::{Event, EventPatch, GuestInsights, Invitee, NewEvent, NewInvitee};

use super::{invitations::parse_status, response::ApiResponse, AppError};
use crate::{cache::CachedResponse, state::AppState};

/// Body of `POST /api/v1/events/{id}/invite`.
///
/// The status is parsed after extraction so an unknown value is reported as
/// a validation error.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
}

// ============================================================================
// Events
// ============================================================================

/// List all events (GET /api/v1/events).
pub async fn list_events(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Result<CachedResponse, AppError> {
    let services = &state.services;
    state
        .response_cache
        .get_or_fetch(method.as_str(), &request_path(&uri), || async move {
            let events = services.events.list().await?;
            Ok::<_, AppError>(ApiResponse::success(events))
        })
        .await
}

/// List the events a user owns (GET /api/v1/events/user/{user_id}).
pub async fn list_user_events(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Event>>>, AppError> {
    let events = state.services.events.list_by_user(user_id).await?;
    Ok(Json(ApiResponse::success(events)))
}

/// Create a new event (POST /api/v1/events).
pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<NewEvent>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.services.events.create(payload).await?;
    state.response_cache.invalidate_events().await;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(event))))
}

/// Get a single event by ID (GET /api/v1/events/{id}).
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Result<CachedResponse, AppError> {
    let services = &state.services;
    state
        .response_cache
        .get_or_fetch(method.as_str(), &request_path(&uri), || async move {
            let event = services
                .events
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Event", id))?;
            Ok::<_, AppError>(ApiResponse::success(event))
        })
        .await
}

/// Update an event by ID (PUT /api/v1/events/{id}).
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<ApiResponse<Event>>, AppError> {
    let event = state
        .services
        .events
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;
    state.response_cache.invalidate_events().await;
    Ok(Json(ApiResponse::success(event)))
}

/// Delete an event by ID (DELETE /api/v1/events/{id}).
///
/// Relational backends also drop the event's invitees, so cached invitation
/// reads are invalidated too.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.services.events.delete(id).await?;
    state.response_cache.invalidate_events().await;
    state.response_cache.invalidate_invitations().await;
    Ok(Json(ApiResponse::message("Event deleted successfully")))
}

// ============================================================================
// Invitees of an event
// ============================================================================

/// Invite a user to an event (POST /api/v1/events/{id}/invite).
pub async fn invite(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<InviteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invitee = NewInvitee {
        event_id,
        user_id: payload.user_id,
        status: parse_status(payload.status)?,
        qr_code: payload.qr_code,
    };
    let invitee = state.services.invitees.create(invitee).await?;
    state.response_cache.invalidate_invitations().await;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(invitee))))
}

/// List the invitees of an event (GET /api/v1/events/{id}/invitees).
pub async fn list_event_invitees(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Invitee>>>, AppError> {
    let invitees = state.services.invitees.list_by_event(event_id).await?;
    Ok(Json(ApiResponse::success(invitees)))
}

/// Attendance counters for an event (GET /api/v1/events/{id}/insights).
pub async fn guest_insights(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ApiResponse<GuestInsights>>, AppError> {
    let insights = state.services.invitees.guest_insights(event_id).await?;
    Ok(Json(ApiResponse::success(insights)))
}

/// Path and query string of a request, as used in cache keys.
pub(super) fn request_path(uri: &axum::http::Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}
