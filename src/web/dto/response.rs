//! Response DTOs.

use serde::Serialize;

/// A bare message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Create a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A message about one account.
#[derive(Debug, Serialize)]
pub struct EmailMessage {
    /// Account email.
    pub email: String,
    /// Message text.
    pub message: String,
}

impl EmailMessage {
    /// Create a response for `email`.
    pub fn new(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            message: message.into(),
        }
    }
}

/// Profile of the logged-in user.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Account email.
    pub email: String,
}

/// A freshly issued reset token.
#[derive(Debug, Serialize)]
pub struct ResetTokenResponse {
    /// Account email.
    pub email: String,
    /// Token to present to `PUT /reset_password`.
    pub reset_token: String,
}

/// Service status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `"OK"` while the service answers.
    pub status: &'static str,
}
