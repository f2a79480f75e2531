use crate::{AppState, access::LOGIN_ROUTE, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. `/login` is also the target of every
/// redirect issued to an anonymous visitor.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /login  -> landing view
        // POST /login -> local-only role picker
        .route(LOGIN_ROUTE, get(handlers::login_page).post(handlers::login))
        // POST /logout
        // Clears the process session before responding.
        .route("/logout", post(handlers::logout))
}
