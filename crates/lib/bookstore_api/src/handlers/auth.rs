//! User registration and login handlers.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{CredentialsRequest, RegisterResponse, TokenResponse};

/// `POST /api/users/register`: create a new user account. No token is issued.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<Json<RegisterResponse>> {
    state.auth.register(&body.username, &body.password).await?;
    Ok(Json(RegisterResponse { succeeded: true }))
}

/// `POST /api/users/login`: exchange username + password for a bearer token.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<Json<TokenResponse>> {
    let issued = state.auth.login(&body.username, &body.password).await?;
    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}
