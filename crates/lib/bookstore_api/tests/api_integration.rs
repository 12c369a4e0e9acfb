//! Integration tests that build the router over in-memory stores and drive
//! registration, login and role-gated catalog access end to end.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bookstore_api::config::ApiConfig;
use bookstore_api::error::GENERIC_SERVER_ERROR;
use bookstore_api::{AppState, router};
use bookstore_core::auth::jwt::{JwtSettings, TokenSigner};
use bookstore_core::auth::memory::InMemoryCredentialStore;
use bookstore_core::auth::store::CredentialStore;
use bookstore_core::auth::{ADMINISTRATOR, AuthError, CUSTOMER};
use bookstore_core::catalog::memory::InMemoryCatalog;
use bookstore_core::models::auth::UserIdentity;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret-integration";
const ISSUER: &str = "bookstore-test";

struct TestApp {
    app: Router,
    store: Arc<InMemoryCredentialStore>,
}

fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: SECRET.into(),
        issuer: ISSUER.into(),
        expiration_minutes: 30,
    }
}

fn app_with_store(store: Arc<dyn CredentialStore>) -> Router {
    let catalog = InMemoryCatalog::new();
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        pg_connection_url: "postgres://unused".into(),
        jwt: jwt_settings(),
    };
    router(AppState::new(
        config,
        store,
        Arc::new(catalog.clone()),
        Arc::new(catalog),
    ))
}

fn test_app() -> TestApp {
    let store = Arc::new(InMemoryCredentialStore::new());
    TestApp {
        app: app_with_store(store.clone()),
        store,
    }
}

/// Credential store whose backend is unreachable.
struct UnreachableStore;

#[async_trait]
impl CredentialStore for UnreachableStore {
    async fn find_by_username(&self, _username: &str) -> Result<Option<UserIdentity>, AuthError> {
        Err(AuthError::Internal("db down".into()))
    }

    async fn create_user(
        &self,
        _username: &str,
        _password_hash: &str,
    ) -> Result<UserIdentity, AuthError> {
        Err(AuthError::Internal("db down".into()))
    }

    async fn roles_for(&self, _user_id: &str) -> Result<Vec<String>, AuthError> {
        Err(AuthError::Internal("db down".into()))
    }

    async fn grant_role(&self, _user_id: &str, _role: &str) -> Result<(), AuthError> {
        Err(AuthError::Internal("db down".into()))
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn register(app: &Router, username: &str, password: &str) -> StatusCode {
    let (status, _) = send(
        app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    status
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await
}

/// Register `username`, grant `roles` out of band, and return a fresh token.
async fn user_with_roles(t: &TestApp, username: &str, roles: &[&str]) -> String {
    assert_eq!(register(&t.app, username, "P@ssw0rd1").await, StatusCode::OK);
    let user = t
        .store
        .find_by_username(username)
        .await
        .unwrap()
        .expect("registered user");
    for role in roles {
        t.store.grant_role(&user.id, role).await.unwrap();
    }
    let (status, body) = login(&t.app, username, "P@ssw0rd1").await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn register_and_login_end_to_end() {
    let t = test_app();

    assert_eq!(register(&t.app, "alice", "P@ssw0rd1").await, StatusCode::OK);

    let (status, body) = login(&t.app, "alice", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = login(&t.app, "alice", "P@ssw0rd1").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token is a string");

    let signer = TokenSigner::new(&jwt_settings());
    let claims = signer.verify(token, Utc::now()).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.iss, ISSUER);
}

#[tokio::test]
async fn unknown_user_and_wrong_password_get_identical_responses() {
    let t = test_app();
    register(&t.app, "alice", "P@ssw0rd1").await;

    let wrong_password = login(&t.app, "alice", "P@ssw0rd2").await;
    let unknown_user = login(&t.app, "nobody", "P@ssw0rd1").await;
    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn failed_registration_is_a_generic_server_error() {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({"username": "bob", "password": "weak"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["message"].as_str().unwrap();
    assert!(!message.contains("Password"), "leaked detail: {message}");

    assert_eq!(register(&t.app, "carol", "P@ssw0rd1").await, StatusCode::OK);
    assert_eq!(
        register(&t.app, "carol", "P@ssw0rd1").await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn store_failure_is_a_generic_server_error() {
    let app = app_with_store(Arc::new(UnreachableStore));

    let (status, body) = login(&app, "alice", "P@ssw0rd1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], GENERIC_SERVER_ERROR);
    assert!(!body.to_string().contains("db down"), "leaked detail: {body}");

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({"username": "alice", "password": "P@ssw0rd1"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("db down"), "leaked detail: {body}");
}

#[tokio::test]
async fn lowercase_bearer_scheme_is_accepted() {
    let t = test_app();
    let token = user_with_roles(&t, "frank", &[CUSTOMER]).await;

    let req = Request::builder()
        .method("GET")
        .uri("/api/books")
        .header(header::AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let resp = t.app.clone().oneshot(req).await.expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unsupported_method_is_not_allowed_for_any_role() {
    let t = test_app();
    let customer = user_with_roles(&t, "grace", &[CUSTOMER]).await;
    let admin = user_with_roles(&t, "heidi", &[ADMINISTRATOR]).await;

    for token in [&customer, &admin] {
        let (status, _) = send(
            &t.app,
            "PUT",
            "/api/books",
            Some(token.as_str()),
            Some(json!({"title": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[tokio::test]
async fn legacy_email_address_field_is_accepted() {
    let t = test_app();
    assert_eq!(
        register(&t.app, "dave@example.com", "P@ssw0rd1").await,
        StatusCode::OK
    );
    let (status, _) = send(
        &t.app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"emailAddress": "dave@example.com", "password": "P@ssw0rd1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn catalog_requires_a_bearer_token() {
    let t = test_app();

    let (status, _) = send(&t.app, "GET", "/api/authors", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&t.app, "GET", "/api/books", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/authors",
        None,
        Some(json!({"firstname": "Frank", "lastname": "Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_without_roles_cannot_read() {
    let t = test_app();
    let token = user_with_roles(&t, "erin", &[]).await;

    let (status, body) = send(&t.app, "GET", "/api/authors", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn customer_reads_but_cannot_write() {
    let t = test_app();
    let admin = user_with_roles(&t, "admin", &[ADMINISTRATOR]).await;
    let customer = user_with_roles(&t, "customer", &[CUSTOMER]).await;

    let (status, author) = send(
        &t.app,
        "POST",
        "/api/authors",
        Some(&admin),
        Some(json!({"firstname": "Frank", "lastname": "Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let author_id = author["id"].as_i64().unwrap();

    let (status, authors) = send(&t.app, "GET", "/api/authors", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(authors.as_array().unwrap().len(), 1);

    let uri = format!("/api/authors/{author_id}");
    let (status, _) = send(&t.app, "GET", &uri, Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/authors",
        Some(&customer),
        Some(json!({"firstname": "Isaac", "lastname": "Asimov"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&t.app, "DELETE", &uri, Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.app,
        "PATCH",
        &uri,
        Some(&customer),
        Some(json!({"id": author_id, "firstname": "F", "lastname": "H"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let t = test_app();
    let signer = TokenSigner::new(&jwt_settings());
    let issued = signer
        .issue(
            "admin",
            "u-1",
            &[ADMINISTRATOR.to_string()],
            Uuid::new_v4(),
            Utc::now() - Duration::hours(1),
        )
        .unwrap();

    let (status, _) = send(&t.app, "GET", "/api/books", Some(&issued.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_from_foreign_issuer_is_rejected() {
    let t = test_app();
    let foreign = TokenSigner::new(&JwtSettings {
        issuer: "someone-else".into(),
        ..jwt_settings()
    });
    let issued = foreign
        .issue_now("admin", "u-1", &[ADMINISTRATOR.to_string()])
        .unwrap();

    let (status, _) = send(&t.app, "GET", "/api/books", Some(&issued.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_manages_authors_and_books() {
    let t = test_app();
    let admin = user_with_roles(&t, "admin", &[ADMINISTRATOR]).await;

    let (status, author) = send(
        &t.app,
        "POST",
        "/api/authors",
        Some(&admin),
        Some(json!({"firstname": "Ursula", "lastname": "Le Guin", "bio": "Earthsea"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let author_id = author["id"].as_i64().unwrap();

    let (status, book) = send(
        &t.app,
        "POST",
        "/api/books",
        Some(&admin),
        Some(json!({
            "title": "A Wizard of Earthsea",
            "year": 1968,
            "isbn": "978-0547773742",
            "price": 8.5,
            "authorId": author_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["author"]["lastname"], "Le Guin");
    let book_id = book["id"].as_i64().unwrap();

    // Book for a missing author
    let (status, _) = send(
        &t.app,
        "POST",
        "/api/books",
        Some(&admin),
        Some(json!({"title": "Orphan", "isbn": "0", "authorId": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Update with mismatched id
    let book_uri = format!("/api/books/{book_id}");
    let (status, _) = send(
        &t.app,
        "PATCH",
        &book_uri,
        Some(&admin),
        Some(json!({
            "id": book_id + 1,
            "title": "x",
            "isbn": "y",
            "authorId": author_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &t.app,
        "PATCH",
        &book_uri,
        Some(&admin),
        Some(json!({
            "id": book_id,
            "title": "A Wizard of Earthsea (50th anniversary)",
            "year": 2018,
            "isbn": "978-0547773742",
            "authorId": author_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, book) = send(&t.app, "GET", &book_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["year"], 2018);

    let (status, author) = send(
        &t.app,
        "GET",
        &format!("/api/authors/{author_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(author["books"].as_array().unwrap().len(), 1);

    // Cascade: deleting the author removes the book
    let author_uri = format!("/api/authors/{author_id}");
    let (status, _) = send(&t.app, "DELETE", &author_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&t.app, "GET", &book_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&t.app, "DELETE", &author_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, "DELETE", "/api/books/0", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
