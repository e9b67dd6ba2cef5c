//! Test helpers for the HTTP integration tests.

#![allow(dead_code)]

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use sessiongate::web::create_app;
use sessiongate::{AuthKind, Config, Database, UserLifecycle};

/// Default session cookie name for the `/api/v1` session strategies.
pub const SESSION_COOKIE: &str = "_my_session_id";

/// Create a configuration using the given strategy.
pub fn create_test_config(kind: AuthKind) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.auth.kind = kind;
    config
}

/// Create a test server with an in-memory database.
pub async fn create_test_server(kind: AuthKind) -> (TestServer, Database) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let router = create_app(&create_test_config(kind), db.clone());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

/// Register a user directly through the lifecycle service.
pub async fn create_user(db: &Database, email: &str, password: &str) {
    UserLifecycle::new(db.clone())
        .register(email, password)
        .await
        .expect("Failed to register test user");
}

/// `Authorization: Basic ...` header for the given raw credentials.
pub fn basic_header(credentials: &str) -> (HeaderName, HeaderValue) {
    let value = format!("Basic {}", STANDARD.encode(credentials));
    (
        AUTHORIZATION,
        HeaderValue::from_str(&value).expect("valid header"),
    )
}

/// `Cookie: name=value` header.
pub fn cookie_header(name: &str, value: &str) -> (HeaderName, HeaderValue) {
    (
        COOKIE,
        HeaderValue::from_str(&format!("{name}={value}")).expect("valid header"),
    )
}
