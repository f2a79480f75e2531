use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::Role;

/// PortalError
///
/// The single error taxonomy of the portal. Access decisions themselves never fail;
/// these variants cover the boundaries around them: role parsing, navigation model
/// validation at startup, token handling and the local-only login endpoint.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("duplicate navigation key: {0}")]
    DuplicateNavigationKey(String),
    #[error("duplicate guarded route: {0}")]
    DuplicateRoute(String),
    #[error("navigation entry {0} allows no roles")]
    EmptyAllowedRoles(String),
    #[error("landing route {route} is not reachable for role {role}")]
    UnreachableLandingRoute { role: Role, route: String },
    #[error("role login is only available in local mode")]
    LoginDisabled,
    #[error("session token was revoked by a later sign-in or sign-out")]
    RevokedToken,
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            PortalError::LoginDisabled => StatusCode::FORBIDDEN,
            PortalError::RevokedToken | PortalError::Token(_) => StatusCode::UNAUTHORIZED,
            PortalError::DuplicateNavigationKey(_)
            | PortalError::DuplicateRoute(_)
            | PortalError::EmptyAllowedRoles(_)
            | PortalError::UnreachableLandingRoute { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
