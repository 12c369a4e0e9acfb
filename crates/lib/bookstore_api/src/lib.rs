//! # bookstore_api
//!
//! HTTP API library for the bookstore.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use bookstore_core::auth::gate::RolePolicy;
use bookstore_core::auth::jwt::TokenSigner;
use bookstore_core::auth::service::AuthService;
use bookstore_core::auth::store::CredentialStore;
use bookstore_core::catalog::{AuthorRepository, BookRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, authors, books};
use crate::middleware::auth::require_roles;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Login/registration service; owns the token signer.
    pub auth: AuthService,
    pub authors: Arc<dyn AuthorRepository>,
    pub books: Arc<dyn BookRepository>,
}

impl AppState {
    /// Build state from configuration and storage backends.
    ///
    /// The token signer is created here, once, from `config.jwt`.
    pub fn new(
        config: ApiConfig,
        credentials: Arc<dyn CredentialStore>,
        authors: Arc<dyn AuthorRepository>,
        books: Arc<dyn BookRepository>,
    ) -> Self {
        let signer = Arc::new(TokenSigner::new(&config.jwt));
        Self {
            auth: AuthService::new(credentials, signer),
            config,
            authors,
            books,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::POST_USERS_REGISTER, post(auth::register_handler))
        .route(routes::POST_USERS_LOGIN, post(auth::login_handler));

    // Catalog reads: Administrator or Customer. `route_layer` keeps the gate off
    // the merged 405 fallback.
    let readers = Router::new()
        .route(routes::AUTHORS, get(authors::list_authors_handler))
        .route(routes::AUTHORS_ID, get(authors::get_author_handler))
        .route(routes::BOOKS, get(books::list_books_handler))
        .route(routes::BOOKS_ID, get(books::get_book_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            (state.clone(), RolePolicy::reader()),
            require_roles,
        ));

    // Catalog mutations: Administrator only
    let administrators = Router::new()
        .route(routes::AUTHORS, post(authors::create_author_handler))
        .route(
            routes::AUTHORS_ID,
            patch(authors::update_author_handler).delete(authors::delete_author_handler),
        )
        .route(routes::BOOKS, post(books::create_book_handler))
        .route(
            routes::BOOKS_ID,
            patch(books::update_book_handler).delete(books::delete_book_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            (state.clone(), RolePolicy::administrator_only()),
            require_roles,
        ));

    Router::new()
        .merge(public)
        .merge(readers)
        .merge(administrators)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
