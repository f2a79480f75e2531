use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Access API Router Module
///
/// Read-only endpoints over the access controller. Each one resolves the request's
/// session through the `CurrentSession` extractor and never redirects.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/session
        .route("/session", get(handlers::get_session))
        // GET /api/navigation
        // The menu sections for the current role, empty when anonymous.
        .route("/navigation", get(handlers::get_navigation))
        // GET /api/authorize?route=/fleet
        // The Decision the guard would take for that route.
        .route("/authorize", get(handlers::get_decision))
}
