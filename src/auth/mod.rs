//! Request authentication and session management.
//!
//! This module provides password hashing, excluded-path matching, session
//! stores, the authentication strategies, the request gate and the user
//! lifecycle service.

mod gate;
mod lifecycle;
mod password;
pub mod paths;
mod session;
mod strategy;

pub use gate::{GateOutcome, RequestGate};
pub use lifecycle::UserLifecycle;
pub use password::{hash_password, verify_password, PasswordError};
pub use paths::{normalize_path, require_auth, ExcludedPaths};
pub use session::{MemorySessionStore, PersistedSessionStore, SessionRecord, SessionStore};
pub use strategy::{authorization_header, session_cookie, AuthStrategy, BasicAuth, SessionAuth};
