//! JSON error responses.
//!
//! Every failure leaves the service as `{"error": {"code", "message"}}`
//! with the status implied by the code.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::GateError;

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    InternalError,
}

impl ErrorCode {
    /// HTTP status sent with this code.
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorFields<'a>,
}

#[derive(Serialize)]
struct ErrorFields<'a> {
    code: ErrorCode,
    message: &'a str,
}

/// Error returned by handlers and by the gate middleware.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 400, for missing or malformed form fields.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// 401, no usable credentials or a wrong password.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// 403, credentials present but no user resolves from them.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// 500. The message goes to the client, so keep store details out of it.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            error: ErrorFields {
                code: self.code,
                message: &self.message,
            },
        };
        (self.code.status_code(), Json(envelope)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code.status_code(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        let code = match &err {
            GateError::Auth(_) => ErrorCode::Unauthorized,
            GateError::NotFound(_) => ErrorCode::NotFound,
            GateError::AlreadyExists(_) => ErrorCode::Conflict,
            GateError::Validation(_) => ErrorCode::UnprocessableEntity,
            GateError::Database(_) | GateError::Io(_) | GateError::Config(_) => {
                tracing::error!("Request failed: {err}");
                return Self::internal("An internal error occurred");
            }
        };
        match err {
            GateError::Auth(msg) | GateError::Validation(msg) => Self::new(code, msg),
            other => Self::new(code, other.to_string()),
        }
    }
}
