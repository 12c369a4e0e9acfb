//! In-memory catalog.
//!
//! Both repositories share one state so the referential rules of the
//! database schema hold here too: author deletes cascade to books, and book
//! writes require an existing author.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AuthorRepository, BookRepository, CatalogError};
use crate::models::catalog::{Author, Book, NewAuthor, NewBook};

#[derive(Debug, Default)]
struct CatalogState {
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, Book>,
    next_author_id: i32,
    next_book_id: i32,
}

impl CatalogState {
    fn author_with_books(&self, author: &Author) -> Author {
        let mut author = author.clone();
        author.books = self
            .books
            .values()
            .filter(|b| b.author_id == author.id)
            .map(Book::summary)
            .collect();
        author
    }

    fn book_with_author(&self, book: &Book) -> Book {
        let mut book = book.clone();
        book.author = self.authors.get(&book.author_id).map(Author::summary);
        book
    }
}

/// Shared in-memory catalog. Clone it to hand out both repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorRepository for InMemoryCatalog {
    async fn find_all(&self) -> Result<Vec<Author>, CatalogError> {
        let state = self.state.read().await;
        Ok(state
            .authors
            .values()
            .map(|a| state.author_with_books(a))
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, CatalogError> {
        let state = self.state.read().await;
        Ok(state.authors.get(&id).map(|a| state.author_with_books(a)))
    }

    async fn create(&self, author: &NewAuthor) -> Result<Author, CatalogError> {
        let mut state = self.state.write().await;
        state.next_author_id += 1;
        let created = Author {
            id: state.next_author_id,
            firstname: author.firstname.clone(),
            lastname: author.lastname.clone(),
            bio: author.bio.clone(),
            books: Vec::new(),
        };
        state.authors.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, author: &NewAuthor) -> Result<bool, CatalogError> {
        let mut state = self.state.write().await;
        let Some(existing) = state.authors.get_mut(&id) else {
            return Ok(false);
        };
        existing.firstname = author.firstname.clone();
        existing.lastname = author.lastname.clone();
        existing.bio = author.bio.clone();
        Ok(true)
    }

    async fn delete(&self, id: i32) -> Result<bool, CatalogError> {
        let mut state = self.state.write().await;
        if state.authors.remove(&id).is_none() {
            return Ok(false);
        }
        state.books.retain(|_, b| b.author_id != id);
        Ok(true)
    }

    async fn is_exist(&self, id: i32) -> Result<bool, CatalogError> {
        Ok(self.state.read().await.authors.contains_key(&id))
    }
}

#[async_trait]
impl BookRepository for InMemoryCatalog {
    async fn find_all(&self) -> Result<Vec<Book>, CatalogError> {
        let state = self.state.read().await;
        Ok(state
            .books
            .values()
            .map(|b| state.book_with_author(b))
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, CatalogError> {
        let state = self.state.read().await;
        Ok(state.books.get(&id).map(|b| state.book_with_author(b)))
    }

    async fn create(&self, book: &NewBook) -> Result<Book, CatalogError> {
        let mut state = self.state.write().await;
        if !state.authors.contains_key(&book.author_id) {
            return Err(CatalogError::UnknownAuthor(book.author_id));
        }
        state.next_book_id += 1;
        let created = Book {
            id: state.next_book_id,
            title: book.title.clone(),
            year: book.year,
            isbn: book.isbn.clone(),
            summary: book.summary.clone(),
            image: book.image.clone(),
            price: book.price,
            author_id: book.author_id,
            author: None,
        };
        state.books.insert(created.id, created.clone());
        Ok(state.book_with_author(&created))
    }

    async fn update(&self, id: i32, book: &NewBook) -> Result<bool, CatalogError> {
        let mut state = self.state.write().await;
        if !state.authors.contains_key(&book.author_id) {
            return Err(CatalogError::UnknownAuthor(book.author_id));
        }
        let Some(existing) = state.books.get_mut(&id) else {
            return Ok(false);
        };
        existing.title = book.title.clone();
        existing.year = book.year;
        existing.isbn = book.isbn.clone();
        existing.summary = book.summary.clone();
        existing.image = book.image.clone();
        existing.price = book.price;
        existing.author_id = book.author_id;
        Ok(true)
    }

    async fn delete(&self, id: i32) -> Result<bool, CatalogError> {
        Ok(self.state.write().await.books.remove(&id).is_some())
    }

    async fn is_exist(&self, id: i32) -> Result<bool, CatalogError> {
        Ok(self.state.read().await.books.contains_key(&id))
    }
}
