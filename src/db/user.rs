//! User model.

use serde::Serialize;

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login email (unique).
    pub email: String,
    /// Password digest (Argon2 PHC string).
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Active session id, if the user is logged in.
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    /// Pending password-reset token.
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Password digest (must be pre-hashed).
    pub hashed_password: String,
}

impl NewUser {
    /// Create a new user record from an email and a password digest.
    pub fn new(email: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            hashed_password: hashed_password.into(),
        }
    }
}

/// Data for updating an existing user.
///
/// Outer `None` leaves a column untouched; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New password digest.
    pub hashed_password: Option<String>,
    /// New session id.
    pub session_id: Option<Option<String>>,
    /// New reset token.
    pub reset_token: Option<Option<String>>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new password digest.
    pub fn hashed_password(mut self, hashed_password: impl Into<String>) -> Self {
        self.hashed_password = Some(hashed_password.into());
        self
    }

    /// Set or clear the session id.
    pub fn session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Set or clear the reset token.
    pub fn reset_token(mut self, reset_token: Option<String>) -> Self {
        self.reset_token = Some(reset_token);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.hashed_password.is_none() && self.session_id.is_none() && self.reset_token.is_none()
    }
}
