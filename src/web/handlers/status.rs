//! Service status and identity views.

use axum::Json;

use crate::db::User;
use crate::web::dto::{MessageResponse, StatusResponse};
use crate::web::error::ApiError;
use crate::web::middleware::OptionalCurrentUser;

/// GET / - Welcome message.
pub async fn index() -> Json<MessageResponse> {
    Json(MessageResponse::new("Bienvenue"))
}

/// GET /api/v1/status - Liveness.
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "OK" })
}

/// GET /api/v1/unauthorized - Always 401.
pub async fn unauthorized() -> ApiError {
    ApiError::unauthorized("Unauthorized")
}

/// GET /api/v1/forbidden - Always 403.
pub async fn forbidden() -> ApiError {
    ApiError::forbidden("Forbidden")
}

/// GET /api/v1/users/me - The identity attached by the gate.
pub async fn me(OptionalCurrentUser(user): OptionalCurrentUser) -> Result<Json<User>, ApiError> {
    user.map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Fallback for unknown `/api/v1` paths. Runs behind the gate.
pub async fn api_not_found() -> ApiError {
    ApiError::not_found("Not found")
}
