//! HTTP handlers.

pub mod account;
pub mod session_auth;
pub mod status;

use std::sync::Arc;

use crate::auth::{AuthStrategy, UserLifecycle};
use crate::Database;

pub use account::*;
pub use session_auth::*;
pub use status::*;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record store.
    pub db: Database,
    /// Strategy guarding `/api/v1`, if authentication is enabled.
    pub strategy: Option<Arc<AuthStrategy>>,
    /// Registration, login and password reset.
    pub lifecycle: UserLifecycle,
    /// Cookie carrying the session id stored on the user record.
    pub user_session_cookie: String,
}

impl AppState {
    /// Create the state for `db` with the given strategy.
    pub fn new(
        db: Database,
        strategy: Option<Arc<AuthStrategy>>,
        user_session_cookie: impl Into<String>,
    ) -> Self {
        Self {
            lifecycle: UserLifecycle::new(db.clone()),
            db,
            strategy,
            user_session_cookie: user_session_cookie.into(),
        }
    }
}
