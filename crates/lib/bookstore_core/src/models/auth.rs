//! Authentication domain models.

use serde::{Deserialize, Serialize};

/// Stored user identity. Roles are assigned out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    /// Login name; doubles as the email address.
    pub username: String,
    pub password_hash: String,
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the username the token was issued to.
    pub sub: String,
    /// Unique token id, fresh for every issuance.
    pub jti: String,
    /// Stable user id from the credential store.
    #[serde(default)]
    pub uid: String,
    /// Snapshot of the user's roles at issuance time.
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

impl TokenClaims {
    /// Whether the token carries `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
