//! Authorization middleware: Bearer token extraction and role gating.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use bookstore_core::auth::gate::{Decision, DenyReason, RolePolicy, authorize};
use bookstore_core::models::auth::TokenClaims;
use chrono::Utc;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Verified claims of the caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

/// Token from a `Bearer` credential. The scheme name is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    scheme.eq_ignore_ascii_case("Bearer").then_some(token)
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, runs the
/// authorization gate against `policy` and injects `AuthenticatedUser` into
/// request extensions.
///
/// Install with `from_fn_with_state((state, policy), require_roles)`.
pub async fn require_roles(
    State((state, policy)): State<(AppState, RolePolicy)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = bearer_token(header)
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?;

    match authorize(state.auth.signer(), token.trim(), &policy, Utc::now()) {
        Decision::Allow(claims) => {
            debug!(sub = %claims.sub, roles = ?claims.roles, "request authorized");
            request.extensions_mut().insert(AuthenticatedUser(claims));
            Ok(next.run(request).await)
        }
        Decision::Deny(DenyReason::Unauthenticated(reason)) => {
            debug!(%reason, "bearer token rejected");
            Err(AppError::Unauthorized("Invalid or expired token".into()))
        }
        Decision::Deny(DenyReason::Forbidden) => {
            debug!(required = ?policy.required(), "caller lacks a required role");
            Err(AppError::Forbidden("Insufficient role".into()))
        }
    }
}
