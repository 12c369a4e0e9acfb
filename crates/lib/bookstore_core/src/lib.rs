//! # bookstore_core
//!
//! Core domain logic for the bookstore: credential verification, bearer
//! token issuance and verification, role-based authorization, and the
//! author/book catalog repositories.

pub mod auth;
pub mod catalog;
pub mod migrate;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
