//! Author request handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use bookstore_core::models::catalog::Author;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AuthorCreateRequest, AuthorUpdateRequest};

fn not_found(id: i32) -> AppError {
    warn!(id, "author not found");
    AppError::NotFound(format!("Author {id} was not found"))
}

/// `GET /api/authors`: all authors with their books.
pub async fn list_authors_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.authors.find_all().await?;
    info!(count = authors.len(), "listed authors");
    Ok(Json(authors))
}

/// `GET /api/authors/{id}`
pub async fn get_author_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Author>> {
    let author = state
        .authors
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(author))
}

/// `POST /api/authors`: administrators only.
pub async fn create_author_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<AuthorCreateRequest>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let new_author = body.validate().inspect_err(|e| warn!(%e, "author data was incomplete"))?;
    let author = state.authors.create(&new_author).await?;
    info!(id = author.id, by = %user.0.sub, "author created");
    Ok((StatusCode::CREATED, Json(author)))
}

/// `PATCH /api/authors/{id}`: administrators only.
pub async fn update_author_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(body): Json<AuthorUpdateRequest>,
) -> AppResult<StatusCode> {
    if id < 1 || id != body.id {
        warn!(id, body_id = body.id, "author update with bad data");
        return Err(AppError::Validation("id does not match request body".into()));
    }
    if !state.authors.is_exist(id).await? {
        return Err(not_found(id));
    }
    let changes = body.validate()?;
    if !state.authors.update(id, &changes).await? {
        return Err(AppError::Internal(format!("author {id} update failed")));
    }
    info!(id, by = %user.0.sub, "author updated");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/authors/{id}`: administrators only. Cascades to books.
pub async fn delete_author_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if id < 1 {
        return Err(AppError::Validation("id must be positive".into()));
    }
    if !state.authors.is_exist(id).await? {
        return Err(not_found(id));
    }
    if !state.authors.delete(id).await? {
        return Err(AppError::Internal(format!("author {id} delete failed")));
    }
    info!(id, by = %user.0.sub, "author deleted");
    Ok(StatusCode::NO_CONTENT)
}
