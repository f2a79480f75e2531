use crate::{
    AppState,
    access::{LOGIN_ROUTE, default_route_for, redirect_target},
    auth::{CurrentSession, issue_token},
    config::Env,
    error::{PortalError, PortalResult},
    models::{
        Decision, LandingView, LoginRequest, LoginResponse, NavigationSection, Role, Session,
        ViewResponse,
    },
};
use axum::{
    Json,
    extract::{MatchedPath, OriginalUri, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// DecisionQuery
///
/// Query parameters of GET /api/authorize.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct DecisionQuery {
    /// The route the front-end is about to open, e.g. `/fleet`.
    pub route: String,
}

// --- Public Handlers ---

/// login_page
///
/// [Public Route] The landing view for anonymous visitors. Every redirect issued
/// for a missing session points here.
#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Landing view", body = LandingView))
)]
pub async fn login_page() -> Json<LandingView> {
    Json(LandingView {
        route: LOGIN_ROUTE.to_string(),
        roles: Role::ALL.to_vec(),
    })
}

/// login
///
/// [Public Route, Local only] Role picker for development. It signs the process
/// session in as the chosen role and returns a matching session token. No credentials
/// are checked, so production refuses it.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Disabled outside local mode")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> PortalResult<Json<LoginResponse>> {
    if state.config.env != Env::Local {
        return Err(PortalError::LoginDisabled);
    }

    let role: Role = payload.role.parse()?;
    let generation = state.sessions.sign_in(Session::authenticated(role)).await;
    let token = issue_token(&state.config, Uuid::new_v4(), role, generation)?;

    Ok(Json(LoginResponse {
        token,
        role,
        landing_route: default_route_for(role).to_string(),
    }))
}

/// logout
///
/// [Public Route] Clears the process session and revokes every token issued for it.
/// Returns only after both happened, so the next guarded request is evaluated
/// without the old role.
///
/// Outside local mode there is no process session and tokens come from an external
/// issuer, so nothing is revoked there.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    if state.config.env == Env::Local {
        state.sessions.sign_out().await;
    }
    StatusCode::NO_CONTENT
}

// --- Access API Handlers ---

/// get_session
///
/// Returns the session resolved for this request, or `null` when anonymous.
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session or null", body = Session),
        (status = 401, description = "Unknown role presented")
    )
)]
pub async fn get_session(CurrentSession(session): CurrentSession) -> Json<Option<Session>> {
    Json(session)
}

/// get_navigation
///
/// The menu sections visible to the current session. Anonymous callers get an empty list.
#[utoipa::path(
    get,
    path = "/api/navigation",
    responses((status = 200, description = "Visible navigation", body = [NavigationSection]))
)]
pub async fn get_navigation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Json<Vec<NavigationSection>> {
    Json(state.access.visible_sections(session.as_ref()))
}

/// get_decision
///
/// Lets the front-end ask ahead of navigation what would happen on `route`.
/// A route without a guard gets the same redirect as a forbidden one.
#[utoipa::path(
    get,
    path = "/api/authorize",
    params(DecisionQuery),
    responses(
        (status = 200, description = "Access decision", body = Decision)
    )
)]
pub async fn get_decision(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<DecisionQuery>,
) -> Json<Decision> {
    Json(state.access.decide(session.as_ref(), &query.route))
}

/// unknown_route
///
/// Router fallback. A `GET` for a view that does not exist is redirected exactly
/// like a denied one, so probing cannot tell guarded routes from missing ones.
/// Unknown API paths stay a plain 404 and other methods a 405.
pub async fn unknown_route(
    CurrentSession(session): CurrentSession,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Response {
    if uri.path().starts_with("/api/") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let target = redirect_target(session.as_ref());
    tracing::info!(
        route = %uri.path(),
        role = ?session.map(|session| session.role),
        target = %target,
        "Access redirected"
    );
    Redirect::to(target).into_response()
}

// --- Guarded View Handler ---

/// render_view
///
/// [Guarded Route] Shared handler for every guarded view. The guard middleware has
/// already allowed the request, so only the view payload is assembled here.
pub async fn render_view(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    matched: MatchedPath,
) -> Result<Json<ViewResponse>, Redirect> {
    // Only reachable without a session if the route was mounted without its guard.
    let session = session
        .filter(|session| session.authenticated)
        .ok_or_else(|| Redirect::to(LOGIN_ROUTE))?;

    let route = matched.as_str();
    let label = state
        .access
        .model()
        .entry_for_route(route)
        .map(|entry| entry.label.clone());

    Ok(Json(ViewResponse {
        route: route.to_string(),
        label,
        role: session.role,
        navigation: state.access.visible_sections(Some(&session)),
    }))
}
