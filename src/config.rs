use std::env;

/// Fallback signing secret for local development only.
pub const LOCAL_JWT_SECRET: &str = "roadworks-local-session-secret";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// Eight hours, one working shift.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;

/// AppConfig
///
/// Holds the application's configuration. Immutable once loaded and pulled into
/// handlers and extractors through `FromRef`.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls the role picker and the dev role header.
    pub env: Env,
    // Secret used to sign and validate session tokens.
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Lifetime of issued session tokens, in seconds.
    pub session_ttl_secs: u64,
}

/// Env
///
/// Defines the runtime context: local development utilities versus hardened production.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics in production when `SESSION_JWT_SECRET` is not set, so the server never
    /// signs sessions with the public development secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => env::var("SESSION_JWT_SECRET")
                .expect("FATAL: SESSION_JWT_SECRET must be set in production."),
            Env::Local => {
                env::var("SESSION_JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string())
            }
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Self {
            env,
            jwt_secret,
            bind_addr,
            session_ttl_secs,
        }
    }
}
