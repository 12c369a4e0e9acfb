//! JWT token issuance and verification.
//!
//! Tokens are HS256-signed and stateless: nothing is stored server side and
//! a token stays valid until its `exp` claim passes.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};
use uuid::Uuid;

use super::{AuthError, TokenError};
use crate::models::auth::TokenClaims;

/// Default issuer, also written as the audience.
pub const DEFAULT_ISSUER: &str = "bookstore-api";

/// Default access token lifetime in minutes.
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 60;

/// Signing configuration. Built once at startup and never mutated.
#[derive(Clone)]
pub struct JwtSettings {
    /// Shared HMAC secret.
    pub secret: String,
    /// Value of both the `iss` and `aud` claims.
    pub issuer: String,
    /// Token lifetime.
    pub expiration_minutes: i64,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies bearer tokens for a single issuer and key.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetime: Duration,
}

impl TokenSigner {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller-supplied clock in `verify`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.issuer.as_str()]);

        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            issuer: settings.issuer.clone(),
            lifetime: Duration::minutes(settings.expiration_minutes),
        }
    }

    /// Configured issuer.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign a token for `subject` carrying a snapshot of `roles`.
    ///
    /// `jti` must be unique per call; `issue_now` draws a random v4 UUID.
    /// `now` is truncated to whole seconds so `expires_at` equals the `exp` claim.
    pub fn issue(
        &self,
        subject: &str,
        user_id: &str,
        roles: &[String],
        jti: Uuid,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let now = now.trunc_subsecs(0);
        let expires_at = now + self.lifetime;
        let claims = TokenClaims {
            sub: subject.to_string(),
            jti: jti.to_string(),
            uid: user_id.to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            aud: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))?;
        Ok(IssuedToken {
            token,
            claims,
            expires_at,
        })
    }

    /// Sign a token at the current time with a fresh unique id.
    pub fn issue_now(
        &self,
        subject: &str,
        user_id: &str,
        roles: &[String],
    ) -> Result<IssuedToken, AuthError> {
        self.issue(subject, user_id, roles, Uuid::new_v4(), Utc::now())
    }

    /// Verify a token as of `now`, returning its claims on success.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };
        if URL_SAFE_NO_PAD.decode(header).is_err() || URL_SAFE_NO_PAD.decode(payload).is_err() {
            return Err(TokenError::Malformed);
        }
        if signature.is_empty() || URL_SAFE_NO_PAD.decode(signature).is_err() {
            return Err(TokenError::BadSignature);
        }

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => TokenError::IssuerMismatch,
        _ => TokenError::Malformed,
    }
}

/// Resolve the JWT secret: env var `JWT_SECRET` → `AUTH_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(secret) = std::env::var("AUTH_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    resolve_persisted_secret(&jwt_secret_path())
}

/// Read the secret stored at `path`, generating and persisting one if absent.
pub fn resolve_persisted_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!(path = %parent.display(), error = %e, "could not create JWT secret directory");
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not persist JWT secret"),
    }
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bookstore")
        .join("jwt-secret")
}
