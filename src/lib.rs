use axum::{
    Router,
    extract::{FromRef, MatchedPath, Request, State},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control core: pure decisions over a static navigation model.
pub mod access;
pub mod models;
pub mod navigation;

// Boundaries around the core: sessions, tokens, configuration, errors.
pub mod auth;
pub mod config;
pub mod error;
pub mod session;

// Presentation adapter.
pub mod handlers;
pub mod routes;
use routes::{api, guarded, public};

// --- Public Re-exports ---

pub use access::{AccessController, AccessState, authorize, default_route_for, redirect_target};
pub use auth::CurrentSession;
pub use config::AppConfig;
pub use error::{PortalError, PortalResult};
pub use models::{Decision, NavGroup, NavigationEntry, Role, RouteGuard, Session};
pub use navigation::NavigationModel;
pub use session::{InMemorySessionProvider, SessionProvider, SessionState};

/// ApiDoc
///
/// OpenAPI document for the access API, served at `/api-docs/openapi.json`.
/// Guarded views share one handler and are not listed individually.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login_page, handlers::login, handlers::logout,
        handlers::get_session, handlers::get_navigation, handlers::get_decision,
    ),
    components(
        schemas(
            models::Role, models::Session, models::NavGroup, models::NavigationEntry,
            models::NavigationSection, models::RouteGuard, models::Decision,
            models::LoginRequest, models::LoginResponse, models::LandingView,
            models::ViewResponse,
        )
    ),
    tags(
        (name = "roadworks-portal", description = "Road construction portal access API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The shared application state: the read-only access controller, the session
/// provider (the single mutable piece) and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub access: AccessState,
    pub sessions: SessionState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AccessState {
    fn from_ref(app_state: &AppState) -> AccessState {
        app_state.access.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// guard_middleware
///
/// Route layer in front of every guarded view. It looks up the guard of the matched
/// route and asks the access controller for a decision. `Allow` runs the view.
/// `Redirect` answers `303 See Other` with no body, so a denied caller learns
/// nothing about the route.
async fn guard_middleware(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    matched: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let Some(guard) = state.access.guard_for(matched.as_str()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.access.authorize(session.as_ref(), guard) {
        Decision::Allow => {
            tracing::debug!(
                route = %guard.route,
                role = ?session.map(|session| session.role),
                "Access granted"
            );
            next.run(request).await
        }
        Decision::Redirect { target } => {
            tracing::info!(
                route = %guard.route,
                role = ?session.map(|session| session.role),
                target = %target,
                "Access redirected"
            );
            Redirect::to(&target).into_response()
        }
    }
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // The SPA may be served from another origin during development.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 1. Guarded views. `route_layer` runs the guard only for matched routes, so the
    //    middleware always sees a `MatchedPath`.
    let guarded_views = guarded::guarded_routes(&state.access).route_layer(
        middleware::from_fn_with_state(state.clone(), guard_middleware),
    );

    // 2. Public and API routes next to the views. Anything unmatched goes to the
    //    fallback, which answers like a denied guard.
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/api", api::api_routes())
        .merge(guarded_views)
        .fallback(handlers::unknown_route)
        .with_state(state);

    // 3. Global layers: request id outermost so the trace span can read it.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
