use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        events::{
            create_event, delete_event, get_event, guest_insights, invite, list_event_invitees,
            list_events, list_user_events, update_event,
        },
        health::livez,
        invitations::{
            check_in, delete_invitation, get_invitation, list_invitations,
            list_user_invitations, update_invitation, update_status,
        },
        users::{create_user, delete_user, get_user, list_users, update_user},
    },
    state::AppState,
};

/// Upper bound on the time spent handling one request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        // User routes
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Event routes
        .route("/v1/events", get(list_events).post(create_event))
        .route("/v1/events/user/{user_id}", get(list_user_events))
        .route(
            "/v1/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/v1/events/{id}/invite", post(invite))
        .route("/v1/events/{id}/invitees", get(list_event_invitees))
        .route("/v1/events/{id}/insights", get(guest_insights))
        // Invitation routes
        .route("/v1/invitations", get(list_invitations))
        .route("/v1/invitations/user/{user_id}", get(list_user_invitations))
        .route(
            "/v1/invitations/{id}",
            get(get_invitation)
                .put(update_invitation)
                .delete(delete_invitation),
        )
        .route("/v1/invitations/{id}/status", patch(update_status))
        .route("/v1/invitations/{id}/check-in", post(check_in))
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .with_state(state)
}
