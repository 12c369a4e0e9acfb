//! Credential store contract.
//!
//! The store is the system of record for user identities and their roles.
//! The authentication service only talks to it through this trait so the
//! Postgres and in-memory backends are interchangeable.

use async_trait::async_trait;

use super::AuthError;
use super::password::{verify_against_dummy, verify_password};
use crate::models::auth::UserIdentity;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look a user up by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, AuthError>;

    /// Persist a new identity.
    ///
    /// Rejects empty or duplicate usernames with `AuthError::RegistrationFailed`.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserIdentity, AuthError>;

    /// Role names currently assigned to the user.
    async fn roles_for(&self, user_id: &str) -> Result<Vec<String>, AuthError>;

    /// Assign a role. Granting a role the user already holds is a no-op.
    async fn grant_role(&self, user_id: &str, role: &str) -> Result<(), AuthError>;

    /// Check a username/password pair.
    ///
    /// Returns `None` both for unknown users and for wrong passwords. Both
    /// paths run one bcrypt verification.
    async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserIdentity>, AuthError> {
        let Some(user) = self.find_by_username(username).await? else {
            verify_against_dummy(password);
            return Ok(None);
        };
        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

/// Normalize a username for uniqueness and lookup.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Reasons a username cannot be registered, before consulting the store.
pub(crate) fn username_problems(username: &str) -> Vec<String> {
    if username.trim().is_empty() {
        vec!["Username is required".to_string()]
    } else {
        Vec::new()
    }
}

/// Message reported for a duplicate username.
pub(crate) fn duplicate_username(username: &str) -> String {
    format!("Username '{}' is already taken", username.trim())
}
