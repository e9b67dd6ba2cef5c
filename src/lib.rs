//! sessiongate - request authentication and session management for HTTP APIs.
//!
//! Interchangeable authentication strategies (header presence, HTTP Basic,
//! in-memory and persisted session cookies) behind a per-request gate, plus a
//! user lifecycle service for registration, login and password reset.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, verify_password, AuthStrategy, BasicAuth, ExcludedPaths, GateOutcome,
    PasswordError, RequestGate, SessionAuth, SessionStore, UserLifecycle,
};
pub use config::{AuthKind, Config};
pub use db::{Database, NewUser, User, UserRepository, UserUpdate};
pub use error::{GateError, Result};
pub use web::WebServer;
