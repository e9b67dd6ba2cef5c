//! Error types for sessiongate.

use thiserror::Error;

/// Common error type for sessiongate.
#[derive(Error, Debug)]
pub enum GateError {
    /// Database error.
    ///
    /// Wraps failures coming out of the record store. Errors from sqlx are
    /// converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A record with the same unique key already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for GateError {
    fn from(e: sqlx::Error) -> Self {
        GateError::Database(e.to_string())
    }
}

/// Result type alias for sessiongate operations.
pub type Result<T> = std::result::Result<T, GateError>;
