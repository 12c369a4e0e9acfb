//! Request and response bodies.
//!
//! Catalog responses serialize the domain models from
//! `bookstore_core::models::catalog` directly.

use bookstore_core::models::catalog::{NewAuthor, NewBook};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Maximum length of a book summary.
pub const MAX_SUMMARY_LENGTH: usize = 500;

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// `POST /api/users/login` and `/api/users/register` body.
///
/// Never log this type: it carries the plaintext password.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[serde(alias = "emailAddress")]
    pub username: String,
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub succeeded: bool,
}

/// `POST /api/authors` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCreateRequest {
    pub firstname: String,
    pub lastname: String,
    pub bio: Option<String>,
}

/// `PATCH /api/authors/{id}` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorUpdateRequest {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub bio: Option<String>,
}

/// `POST /api/books` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreateRequest {
    pub title: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub author_id: i32,
}

/// `PATCH /api/books/{id}` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdateRequest {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub author_id: i32,
}

fn require(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn author_fields(
    firstname: &str,
    lastname: &str,
    bio: &Option<String>,
) -> Result<NewAuthor, AppError> {
    Ok(NewAuthor {
        firstname: require("firstname", firstname)?,
        lastname: require("lastname", lastname)?,
        bio: bio.clone(),
    })
}

fn book_fields(
    title: &str,
    year: Option<i32>,
    isbn: &str,
    summary: &Option<String>,
    image: &Option<String>,
    price: Option<f64>,
    author_id: i32,
) -> Result<NewBook, AppError> {
    let title = require("title", title)?;
    let isbn = require("isbn", isbn)?;
    if let Some(summary) = summary
        && summary.chars().count() > MAX_SUMMARY_LENGTH
    {
        return Err(AppError::Validation(format!(
            "summary must be at most {MAX_SUMMARY_LENGTH} characters"
        )));
    }
    if let Some(price) = price
        && !(price.is_finite() && price >= 0.0)
    {
        return Err(AppError::Validation("price must be a non-negative number".into()));
    }
    if author_id < 1 {
        return Err(AppError::Validation("authorId is required".into()));
    }
    Ok(NewBook {
        title,
        year,
        isbn,
        summary: summary.clone(),
        image: image.clone(),
        price,
        author_id,
    })
}

impl AuthorCreateRequest {
    pub fn validate(&self) -> Result<NewAuthor, AppError> {
        author_fields(&self.firstname, &self.lastname, &self.bio)
    }
}

impl AuthorUpdateRequest {
    pub fn validate(&self) -> Result<NewAuthor, AppError> {
        author_fields(&self.firstname, &self.lastname, &self.bio)
    }
}

impl BookCreateRequest {
    pub fn validate(&self) -> Result<NewBook, AppError> {
        book_fields(
            &self.title,
            self.year,
            &self.isbn,
            &self.summary,
            &self.image,
            self.price,
            self.author_id,
        )
    }
}

impl BookUpdateRequest {
    pub fn validate(&self) -> Result<NewBook, AppError> {
        book_fields(
            &self.title,
            self.year,
            &self.isbn,
            &self.summary,
            &self.image,
            self.price,
            self.author_id,
        )
    }
}
