//! Domain models.
//!
//! These are internal domain models, distinct from the request/response
//! types in `bookstore_api::models`.

pub mod auth;
pub mod catalog;
