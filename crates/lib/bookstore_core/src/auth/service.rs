//! Authentication service: registration and login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::jwt::{IssuedToken, TokenSigner};
use super::password::{hash_password, validate_password};
use super::store::{CredentialStore, username_problems};
use super::AuthError;

/// Orchestrates the credential store and the token signer.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    signer: Arc<TokenSigner>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, signer: Arc<TokenSigner>) -> Self {
        Self { store, signer }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Create a new identity. No token is issued.
    ///
    /// Username and password problems are collected and reported together in
    /// `AuthError::RegistrationFailed`.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        info!(username, "registration attempt");

        let mut problems = username_problems(username);
        problems.extend(validate_password(password));
        if !problems.is_empty() {
            for problem in &problems {
                warn!(username, problem = problem.as_str(), "registration rejected");
            }
            return Err(AuthError::RegistrationFailed(problems));
        }

        let password_hash = hash_password(password)?;
        match self.store.create_user(username, &password_hash).await {
            Ok(user) => {
                info!(username, user_id = %user.id, "user registered");
                Ok(())
            }
            Err(AuthError::RegistrationFailed(problems)) => {
                for problem in &problems {
                    warn!(username, problem = problem.as_str(), "registration rejected");
                }
                Err(AuthError::RegistrationFailed(problems))
            }
            Err(e) => Err(e),
        }
    }

    /// Verify credentials and mint a token at the current time.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        self.login_at(username, password, Uuid::new_v4(), Utc::now())
            .await
    }

    /// Verify credentials and mint a token with an explicit id and clock.
    ///
    /// Unknown users and wrong passwords both yield `InvalidCredentials`.
    pub async fn login_at(
        &self,
        username: &str,
        password: &str,
        jti: Uuid,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        info!(username, "login attempt");

        let Some(user) = self.store.verify(username, password).await? else {
            info!(username, "not authenticated");
            return Err(AuthError::InvalidCredentials);
        };

        let roles = self.store.roles_for(&user.id).await?;
        let issued = self.signer.issue(&user.username, &user.id, &roles, jti, now)?;
        info!(username, roles = ?roles, "successfully authenticated");
        Ok(issued)
    }
}
