use crate::{AppState, access::AccessController, handlers};
use axum::{Router, routing::get};

/// Guarded Router Module
///
/// Registers one GET route per guard in the access controller's table, all served
/// by the shared view handler. The caller must wrap the result in the guard
/// middleware with `route_layer` before merging it.
pub fn guarded_routes(access: &AccessController) -> Router<AppState> {
    access
        .guards()
        .iter()
        .fold(Router::new(), |router, guard| {
            router.route(&guard.route, get(handlers::render_view))
        })
}
