//! Postgres-backed catalog repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{AuthorRepository, BookRepository, CatalogError};
use crate::models::catalog::{Author, AuthorSummary, Book, BookSummary, NewAuthor, NewBook};

type AuthorRow = (i32, String, String, Option<String>);
type BookSummaryRow = (i32, String, Option<i32>, String, Option<f64>, i32);
type BookRow = (
    i32,
    String,
    Option<i32>,
    String,
    Option<String>,
    Option<String>,
    Option<f64>,
    i32,
    String,
    String,
);

const SELECT_BOOK: &str = "SELECT b.id, b.title, b.year, b.isbn, b.summary, b.image, b.price, \
     b.author_id, a.firstname, a.lastname \
     FROM books b JOIN authors a ON a.id = b.author_id";

fn author_from_row((id, firstname, lastname, bio): AuthorRow, books: Vec<BookSummary>) -> Author {
    Author {
        id,
        firstname,
        lastname,
        bio,
        books,
    }
}

fn book_from_row(row: BookRow) -> Book {
    let (id, title, year, isbn, summary, image, price, author_id, firstname, lastname) = row;
    Book {
        id,
        title,
        year,
        isbn,
        summary,
        image,
        price,
        author_id,
        author: Some(AuthorSummary {
            id: author_id,
            firstname,
            lastname,
        }),
    }
}

fn summary_from_row((id, title, year, isbn, price, _author_id): BookSummaryRow) -> BookSummary {
    BookSummary {
        id,
        title,
        year,
        isbn,
        price,
    }
}

/// Map a foreign key violation on `books.author_id` to `UnknownAuthor`.
fn book_write_error(e: sqlx::Error, author_id: i32) -> CatalogError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            CatalogError::UnknownAuthor(author_id)
        }
        _ => CatalogError::DbError(e),
    }
}

/// Author repository over the `authors` table.
#[derive(Debug, Clone)]
pub struct PgAuthorRepository {
    pool: PgPool,
}

impl PgAuthorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepository for PgAuthorRepository {
    async fn find_all(&self) -> Result<Vec<Author>, CatalogError> {
        let authors = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, firstname, lastname, bio FROM authors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let books = sqlx::query_as::<_, BookSummaryRow>(
            "SELECT id, title, year, isbn, price, author_id FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_author: HashMap<i32, Vec<BookSummary>> = HashMap::new();
        for row in books {
            by_author.entry(row.5).or_default().push(summary_from_row(row));
        }

        Ok(authors
            .into_iter()
            .map(|row| {
                let books = by_author.remove(&row.0).unwrap_or_default();
                author_from_row(row, books)
            })
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, CatalogError> {
        let Some(row) = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, firstname, lastname, bio FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let books = sqlx::query_as::<_, BookSummaryRow>(
            "SELECT id, title, year, isbn, price, author_id FROM books \
             WHERE author_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(author_from_row(
            row,
            books.into_iter().map(summary_from_row).collect(),
        )))
    }

    async fn create(&self, author: &NewAuthor) -> Result<Author, CatalogError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO authors (firstname, lastname, bio) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&author.firstname)
        .bind(&author.lastname)
        .bind(&author.bio)
        .fetch_one(&self.pool)
        .await?;

        Ok(Author {
            id,
            firstname: author.firstname.clone(),
            lastname: author.lastname.clone(),
            bio: author.bio.clone(),
            books: Vec::new(),
        })
    }

    async fn update(&self, id: i32, author: &NewAuthor) -> Result<bool, CatalogError> {
        let result = sqlx::query(
            "UPDATE authors SET firstname = $2, lastname = $3, bio = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(&author.firstname)
        .bind(&author.lastname)
        .bind(&author.bio)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i32) -> Result<bool, CatalogError> {
        // books.author_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_exist(&self, id: i32) -> Result<bool, CatalogError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

/// Book repository over the `books` table.
#[derive(Debug, Clone)]
pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn find_all(&self) -> Result<Vec<Book>, CatalogError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOK} ORDER BY b.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(book_from_row).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, CatalogError> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOK} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(book_from_row))
    }

    async fn create(&self, book: &NewBook) -> Result<Book, CatalogError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO books (title, year, isbn, summary, image, price, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&book.title)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(&book.summary)
        .bind(&book.image)
        .bind(book.price)
        .bind(book.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| book_write_error(e, book.author_id))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::Internal(format!("book {id} vanished after insert")))
    }

    async fn update(&self, id: i32, book: &NewBook) -> Result<bool, CatalogError> {
        let result = sqlx::query(
            "UPDATE books SET title = $2, year = $3, isbn = $4, summary = $5, image = $6, \
             price = $7, author_id = $8 WHERE id = $1",
        )
        .bind(id)
        .bind(&book.title)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(&book.summary)
        .bind(&book.image)
        .bind(book.price)
        .bind(book.author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| book_write_error(e, book.author_id))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i32) -> Result<bool, CatalogError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_exist(&self, id: i32) -> Result<bool, CatalogError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
