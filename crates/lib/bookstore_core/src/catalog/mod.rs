//! Author and book catalog.
//!
//! Repositories are thin pass-throughs to storage. Referential rules live in
//! the storage layer: deleting an author removes their books, and every book
//! belongs to exactly one existing author.

pub mod memory;
pub mod queries;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::catalog::{Author, Book, NewAuthor, NewBook};

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Author {0} does not exist")]
    UnknownAuthor(i32),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// All authors, each with their books.
    async fn find_all(&self) -> Result<Vec<Author>, CatalogError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, CatalogError>;

    async fn create(&self, author: &NewAuthor) -> Result<Author, CatalogError>;

    /// Returns `false` when no row changed.
    async fn update(&self, id: i32, author: &NewAuthor) -> Result<bool, CatalogError>;

    /// Deletes the author and, by cascade, their books.
    async fn delete(&self, id: i32) -> Result<bool, CatalogError>;

    async fn is_exist(&self, id: i32) -> Result<bool, CatalogError>;
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books, each with its author.
    async fn find_all(&self) -> Result<Vec<Book>, CatalogError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, CatalogError>;

    /// Fails with `CatalogError::UnknownAuthor` if `author_id` does not exist.
    async fn create(&self, book: &NewBook) -> Result<Book, CatalogError>;

    /// Returns `false` when no row changed.
    async fn update(&self, id: i32, book: &NewBook) -> Result<bool, CatalogError>;

    async fn delete(&self, id: i32) -> Result<bool, CatalogError>;

    async fn is_exist(&self, id: i32) -> Result<bool, CatalogError>;
}
