//! In-memory credential store.
//!
//! Same semantics as the Postgres store; used by tests and for running the
//! API without a database.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::AuthError;
use super::store::{CredentialStore, duplicate_username, normalize_username, username_problems};
use crate::models::auth::UserIdentity;

/// Credential store backed by concurrent hash maps.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    /// Keyed by normalized username.
    users: DashMap<String, UserIdentity>,
    /// Keyed by user id.
    roles: DashMap<String, Vec<String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, AuthError> {
        Ok(self
            .users
            .get(&normalize_username(username))
            .map(|u| u.value().clone()))
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserIdentity, AuthError> {
        let problems = username_problems(username);
        if !problems.is_empty() {
            return Err(AuthError::RegistrationFailed(problems));
        }

        match self.users.entry(normalize_username(username)) {
            Entry::Occupied(_) => Err(AuthError::RegistrationFailed(vec![duplicate_username(
                username,
            )])),
            Entry::Vacant(slot) => {
                let user = UserIdentity {
                    id: Uuid::new_v4().to_string(),
                    username: username.trim().to_string(),
                    password_hash: password_hash.to_string(),
                };
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn roles_for(&self, user_id: &str) -> Result<Vec<String>, AuthError> {
        Ok(self
            .roles
            .get(user_id)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    async fn grant_role(&self, user_id: &str, role: &str) -> Result<(), AuthError> {
        if !self.users.iter().any(|u| u.id == user_id) {
            return Err(AuthError::MissingUser);
        }
        let mut roles = self.roles.entry(user_id.to_string()).or_default();
        if !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
        Ok(())
    }
}
