//! Authentication and authorization logic.
//!
//! Provides password hashing, the credential store contract, JWT issuance
//! and verification, the login/register service and the per-request
//! authorization gate shared by `bookstore_api` handlers and middleware.

pub mod gate;
pub mod jwt;
pub mod memory;
pub mod password;
pub mod queries;
pub mod service;
pub mod store;

use thiserror::Error;

/// Role granted to catalog administrators. Required for every mutation.
pub const ADMINISTRATOR: &str = "Administrator";

/// Role granted to regular customers. Sufficient for catalog reads.
pub const CUSTOMER: &str = "Customer";

/// Reasons a bearer token cannot be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token issuer does not match")]
    IssuerMismatch,

    #[error("token is malformed")]
    Malformed,
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password. The two cases are never distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Registration failed: {}", .0.join("; "))]
    RegistrationFailed(Vec<String>),

    #[error("User not found")]
    MissingUser,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
