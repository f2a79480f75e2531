use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::{PortalError, PortalResult},
    models::{Role, Session},
    session::SessionState,
};

/// Development-only header that selects a role without a token.
pub const ROLE_HEADER: &str = "x-user-role";

/// Claims
///
/// Payload of a session token. `role` stays a plain string on the wire so that an
/// unknown role is reported as such instead of as a generic decoding failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): an opaque identifier for the signed-in principal.
    pub sub: Uuid,
    pub role: String,
    /// Session generation the token belongs to. See `SessionProvider::generation`.
    pub generation: u64,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Signs a session token for `role` in session `generation`, valid for
/// `config.session_ttl_secs`.
pub fn issue_token(
    config: &AppConfig,
    subject: Uuid,
    role: Role,
    generation: u64,
) -> PortalResult<String> {
    let now = Utc::now().timestamp().max(0) as u64;
    let claims = Claims {
        sub: subject,
        role: role.to_string(),
        generation,
        iat: now as usize,
        exp: now.saturating_add(config.session_ttl_secs) as usize,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Validates a session token against the current session `generation` and turns
/// it into a `Session`.
///
/// # Errors
/// `Token` for bad signatures, malformed or expired tokens; `RevokedToken` when the
/// token was issued before the last sign-in or sign-out; `InvalidRole` when a
/// correctly signed token names a role outside the closed set.
pub fn decode_session(config: &AppConfig, token: &str, generation: u64) -> PortalResult<Session> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let claims = decode::<Claims>(token, &decoding_key, &validation)?.claims;
    if claims.generation != generation {
        return Err(PortalError::RevokedToken);
    }
    Session::from_role_str(&claims.role)
}

/// CurrentSession
///
/// The session of the request, or `None` for an anonymous visitor. Being anonymous
/// is not a rejection: guards turn it into a redirect to the login page.
#[derive(Debug, Clone, Copy)]
pub struct CurrentSession(pub Option<Session>);

/// CurrentSession Extractor Implementation
///
/// Resolution order:
/// 1. `Authorization: Bearer <token>`. An expired, revoked or undecodable token counts
///    as anonymous.
/// 2. `Env::Local` only: the `x-user-role` development header.
/// 3. `Env::Local` only: the process session held by the `SessionProvider`.
///
/// Rejection: `StatusCode::UNAUTHORIZED` when the request names a role outside
/// the closed set. Such a role is never passed on to the access controller.
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
    SessionState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let sessions = SessionState::from_ref(state);

        // 1. Bearer token. Its presence settles the outcome, whatever the environment.
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        if let Some(token) = bearer {
            return match decode_session(&config, token, sessions.generation()) {
                Ok(session) => Ok(CurrentSession(Some(session))),
                // A signed token naming an unknown role is a broken issuer, not a visitor.
                Err(PortalError::InvalidRole(role)) => {
                    tracing::warn!(%role, "Rejected session token carrying an unknown role");
                    Err(StatusCode::UNAUTHORIZED)
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Treating request with unusable token as anonymous");
                    Ok(CurrentSession(None))
                }
            };
        }

        // Outside local development nothing else can authenticate a request.
        if config.env != Env::Local {
            return Ok(CurrentSession(None));
        }

        // 2. Development role header. It never falls through to the process session.
        if let Some(value) = parts.headers.get(ROLE_HEADER) {
            let session = value
                .to_str()
                .map_err(|_| StatusCode::UNAUTHORIZED)
                .and_then(|role| {
                    Session::from_role_str(role).map_err(|err| {
                        tracing::warn!(error = %err, "Rejected development role header");
                        StatusCode::UNAUTHORIZED
                    })
                })?;
            return Ok(CurrentSession(Some(session)));
        }

        // 3. The process session set by the local role picker.
        Ok(CurrentSession(sessions.current_session().await))
    }
}
