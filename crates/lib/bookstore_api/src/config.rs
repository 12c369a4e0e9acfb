//! API server configuration.

use bookstore_core::auth::jwt::{
    DEFAULT_EXPIRATION_MINUTES, DEFAULT_ISSUER, JwtSettings, resolve_jwt_secret,
};
use tracing::warn;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Token signing key, issuer and lifetime.
    pub jwt: JwtSettings,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                                 |
    /// |--------------------------|-----------------------------------------|
    /// | `BIND_ADDR`              | `127.0.0.1:5000`                        |
    /// | `DATABASE_URL`           | `postgres://localhost:5432/bookstore`   |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file       |
    /// | `JWT_ISSUER`             | `bookstore-api`                         |
    /// | `JWT_EXPIRATION_MINUTES` | `60`                                    |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/bookstore".into()),
            jwt: jwt_settings_from_env(),
        }
    }
}

/// Token settings from `JWT_SECRET`/`AUTH_SECRET`, `JWT_ISSUER` and
/// `JWT_EXPIRATION_MINUTES`.
pub fn jwt_settings_from_env() -> JwtSettings {
    JwtSettings {
        secret: resolve_jwt_secret(),
        issuer: std::env::var("JWT_ISSUER")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ISSUER.into()),
        expiration_minutes: expiration_minutes(std::env::var("JWT_EXPIRATION_MINUTES").ok()),
    }
}

/// Parse a positive minute count, falling back to the default.
fn expiration_minutes(raw: Option<String>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_EXPIRATION_MINUTES;
    };
    match raw.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => minutes,
        _ => {
            warn!(value = %raw, "ignoring invalid JWT_EXPIRATION_MINUTES");
            DEFAULT_EXPIRATION_MINUTES
        }
    }
}
