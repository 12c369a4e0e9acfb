//! Catalog domain models.

use serde::{Deserialize, Serialize};

/// An author together with the books they wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub books: Vec<BookSummary>,
}

/// Author fields for inserts and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub firstname: String,
    pub lastname: String,
    pub bio: Option<String>,
}

/// Book as nested under its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub price: Option<f64>,
}

/// A book together with its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub author_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
}

/// Author as nested under a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
}

/// Book fields for inserts and updates.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub author_id: i32,
}

impl Book {
    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.id,
            title: self.title.clone(),
            year: self.year,
            isbn: self.isbn.clone(),
            price: self.price,
        }
    }
}

impl Author {
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
        }
    }
}
