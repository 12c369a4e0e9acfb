//! Book request handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use bookstore_core::models::catalog::Book;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{BookCreateRequest, BookUpdateRequest};

fn not_found(id: i32) -> AppError {
    warn!(id, "book not found");
    AppError::NotFound(format!("Book {id} was not found"))
}

/// `GET /api/books`: all books with their authors.
pub async fn list_books_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.books.find_all().await?;
    info!(count = books.len(), "listed books");
    Ok(Json(books))
}

/// `GET /api/books/{id}`
pub async fn get_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state
        .books
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(book))
}

/// `POST /api/books`: administrators only.
pub async fn create_book_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<BookCreateRequest>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let new_book = body.validate().inspect_err(|e| warn!(%e, "book data was incomplete"))?;
    let book = state.books.create(&new_book).await?;
    info!(id = book.id, author_id = book.author_id, by = %user.0.sub, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// `PATCH /api/books/{id}`: administrators only.
pub async fn update_book_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(body): Json<BookUpdateRequest>,
) -> AppResult<StatusCode> {
    if id < 1 || id != body.id {
        warn!(id, body_id = body.id, "book update with bad data");
        return Err(AppError::Validation("id does not match request body".into()));
    }
    if !state.books.is_exist(id).await? {
        return Err(not_found(id));
    }
    let changes = body.validate()?;
    if !state.books.update(id, &changes).await? {
        return Err(AppError::Internal(format!("book {id} update failed")));
    }
    info!(id, by = %user.0.sub, "book updated");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/books/{id}`: administrators only.
pub async fn delete_book_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if id < 1 {
        return Err(AppError::Validation("id must be positive".into()));
    }
    if !state.books.is_exist(id).await? {
        return Err(not_found(id));
    }
    if !state.books.delete(id).await? {
        return Err(AppError::Internal(format!("book {id} delete failed")));
    }
    info!(id, by = %user.0.sub, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
