//! Application error types.
//!
//! `AppError` is the single translation point from internal failures to
//! HTTP responses. Internal details are logged and never returned.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookstore_core::auth::AuthError;
use bookstore_core::catalog::CatalogError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Body message for every server-side failure.
pub const GENERIC_SERVER_ERROR: &str =
    "Something went wrong. Please contact the System Administrator.";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::Internal(detail) => {
                error!(detail = detail.as_str(), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    GENERIC_SERVER_ERROR,
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::MissingUser => {
                AppError::Unauthorized("Invalid credentials".into())
            }
            AuthError::Token(_) => AppError::Unauthorized("Invalid or expired token".into()),
            AuthError::RegistrationFailed(reasons) => AppError::Internal(format!(
                "user registration attempt failed: {}",
                reasons.join("; ")
            )),
            AuthError::DbError(e) => AppError::Internal(e.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::UnknownAuthor(id) => {
                AppError::Validation(format!("Author {id} does not exist"))
            }
            CatalogError::DbError(e) => AppError::Internal(e.to_string()),
            CatalogError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
