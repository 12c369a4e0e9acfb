//! Postgres-backed credential store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::AuthError;
use super::store::{CredentialStore, duplicate_username, normalize_username, username_problems};
use crate::models::auth::UserIdentity;

/// Credential store over the `users` and `user_roles` tables.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, AuthError> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT id::text, username, password_hash FROM users WHERE normalized_username = $1",
        )
        .bind(normalize_username(username))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, username, password_hash)| UserIdentity {
            id,
            username,
            password_hash,
        }))
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

        let username = username.trim();
        let user_id = sqlx::query_scalar::<_, String>(
            "INSERT INTO users (username, normalized_username, password_hash) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (normalized_username) DO NOTHING \
             RETURNING id::text",
        )
        .bind(username)
        .bind(normalize_username(username))
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        match user_id {
            Some(id) => Ok(UserIdentity {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            }),
            None => Err(AuthError::RegistrationFailed(vec![duplicate_username(
                username,
            )])),
        }
    }

    async fn roles_for(&self, user_id: &str) -> Result<Vec<String>, AuthError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = $1::uuid ORDER BY role",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn grant_role(&self, user_id: &str, role: &str) -> Result<(), AuthError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1::uuid)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AuthError::MissingUser);
        }

        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1::uuid, $2) \
             ON CONFLICT (user_id, role) DO NOTHING",
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
