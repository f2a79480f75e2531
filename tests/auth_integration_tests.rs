use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use roadworks_portal::{
    AccessController, AppState, InMemorySessionProvider, PortalError, Role, Session,
    SessionProvider,
    auth::{Claims, CurrentSession, ROLE_HEADER, decode_session, issue_token},
    config::{AppConfig, Env},
};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_SUBJECT: Uuid = Uuid::from_u128(1);

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Signs claims by hand so tests can forge roles and expiry the portal never issues.
fn create_token(role: &str, iat: u64, exp: u64) -> String {
    let claims = Claims {
        sub: TEST_SUBJECT,
        role: role.to_string(),
        generation: 0,
        iat: iat as usize,
        exp: exp as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn test_config(env: Env) -> AppConfig {
    AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

fn create_app_state(env: Env, provider: InMemorySessionProvider) -> AppState {
    AppState {
        access: Arc::new(AccessController::standard().unwrap()),
        sessions: Arc::new(provider),
        config: test_config(env),
    }
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

// --- Token Boundary ---

#[test]
fn issued_token_round_trips_to_session() {
    let config = test_config(Env::Production);
    let token = issue_token(&config, TEST_SUBJECT, Role::ConstructionManager, 0).unwrap();

    let session = decode_session(&config, &token, 0).unwrap();
    assert_eq!(session, Session::authenticated(Role::ConstructionManager));
}

#[test]
fn token_from_earlier_generation_is_revoked() {
    let config = test_config(Env::Production);
    let token = issue_token(&config, TEST_SUBJECT, Role::Admin, 3).unwrap();

    assert!(matches!(
        decode_session(&config, &token, 4),
        Err(PortalError::RevokedToken)
    ));
}

#[test]
fn huge_ttl_saturates_instead_of_expiring() {
    let config = AppConfig {
        session_ttl_secs: u64::MAX,
        ..test_config(Env::Production)
    };
    let token = issue_token(&config, TEST_SUBJECT, Role::Engineer, 0).unwrap();

    let session = decode_session(&config, &token, 0).unwrap();
    assert_eq!(session, Session::authenticated(Role::Engineer));
}

#[test]
fn token_signed_with_other_secret_is_refused() {
    let config = test_config(Env::Production);
    let other = AppConfig {
        jwt_secret: "a-completely-different-secret".to_string(),
        ..test_config(Env::Production)
    };
    let token = issue_token(&other, TEST_SUBJECT, Role::Admin, 0).unwrap();

    assert!(decode_session(&config, &token, 0).is_err());
}

// --- Extractor ---

#[tokio::test]
async fn valid_token_yields_session() {
    let token = create_token("driver", now(), now() + 3600);
    let app_state = create_app_state(Env::Production, InMemorySessionProvider::new());

    let mut parts = get_request_parts(Method::GET, "/transport".parse().unwrap());
    with_bearer(&mut parts, &token);

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(session, Some(Session::authenticated(Role::Driver)));
}

#[tokio::test]
async fn token_with_unknown_role_is_rejected() {
    let token = create_token("superintendent", now(), now() + 3600);
    let app_state = create_app_state(Env::Production, InMemorySessionProvider::new());

    let mut parts = get_request_parts(Method::GET, "/dashboard".parse().unwrap());
    with_bearer(&mut parts, &token);

    let result = CurrentSession::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_issued_before_sign_out_is_anonymous() {
    let provider = InMemorySessionProvider::new();
    let generation = provider.sign_in(Session::authenticated(Role::Admin)).await;
    let token =
        issue_token(&test_config(Env::Local), TEST_SUBJECT, Role::Admin, generation).unwrap();
    provider.sign_out().await;
    let app_state = create_app_state(Env::Local, provider);

    let mut parts = get_request_parts(Method::GET, "/users".parse().unwrap());
    with_bearer(&mut parts, &token);

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(session, None);
}

#[tokio::test]
async fn expired_token_is_anonymous() {
    // Well past the default validation leeway.
    let token = create_token("admin", now() - 7200, now() - 3600);
    let app_state = create_app_state(Env::Production, InMemorySessionProvider::new());

    let mut parts = get_request_parts(Method::GET, "/dashboard".parse().unwrap());
    with_bearer(&mut parts, &token);

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(session, None);
}

#[tokio::test]
async fn missing_header_is_anonymous_in_production() {
    let app_state = create_app_state(
        Env::Production,
        InMemorySessionProvider::with_session(Session::authenticated(Role::Admin)),
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    // The process session is a local development aid only.
    assert_eq!(session, None);
}

#[tokio::test]
async fn local_role_header_selects_role() {
    let app_state = create_app_state(Env::Local, InMemorySessionProvider::new());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static(ROLE_HEADER),
        header::HeaderValue::from_static("engineer"),
    );

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(session, Some(Session::authenticated(Role::Engineer)));
}

#[tokio::test]
async fn local_role_header_with_unknown_role_is_rejected() {
    let app_state = create_app_state(Env::Local, InMemorySessionProvider::new());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static(ROLE_HEADER),
        header::HeaderValue::from_static("foreman"),
    );

    let result = CurrentSession::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn local_role_header_ignored_in_production() {
    let app_state = create_app_state(Env::Production, InMemorySessionProvider::new());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static(ROLE_HEADER),
        header::HeaderValue::from_static("admin"),
    );

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(session, None);
}

#[tokio::test]
async fn local_falls_back_to_process_session() {
    let app_state = create_app_state(
        Env::Local,
        InMemorySessionProvider::with_session(Session::authenticated(Role::Client)),
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(session, Some(Session::authenticated(Role::Client)));
}
