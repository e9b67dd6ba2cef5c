//! Session login and logout for the `/api/v1` strategy.

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::{verify_password, SessionAuth};
use crate::db::{User, UserRepository};
use crate::web::dto::CredentialsForm;
use crate::web::error::ApiError;

use super::AppState;

fn session_strategy(state: &AppState) -> Result<&SessionAuth, ApiError> {
    state
        .strategy
        .as_deref()
        .and_then(|strategy| strategy.as_session())
        .ok_or_else(|| ApiError::not_found("Not found"))
}

/// POST /api/v1/auth_session/login - Start a session with email and password.
pub async fn session_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Json<User>), ApiError> {
    let email = form
        .email()
        .ok_or_else(|| ApiError::bad_request("email missing"))?;
    let password = form
        .password()
        .ok_or_else(|| ApiError::bad_request("password missing"))?;

    let session = session_strategy(&state)?;

    let user = UserRepository::new(state.db.pool())
        .get_by_email(email)
        .await?
        .ok_or_else(|| ApiError::not_found("no user found for this email"))?;

    if !verify_password(password, &user.hashed_password) {
        warn!(user_id = user.id, "Session login: wrong password");
        return Err(ApiError::unauthorized("wrong password"));
    }

    let session_id = session
        .create_session(user.id)
        .await?
        .ok_or_else(|| ApiError::internal("Failed to create session"))?;

    info!(user_id = user.id, "Session login");

    let cookie = Cookie::build((session.cookie_name().to_string(), session_id))
        .path("/")
        .http_only(true);
    Ok((jar.add(cookie), Json(user)))
}

/// DELETE /api/v1/auth_session/logout - Destroy the current session.
pub async fn session_logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let session = session_strategy(&state)?;

    if !session.destroy_session(&headers).await? {
        return Err(ApiError::not_found("Session not found"));
    }

    info!("Session logout");
    let jar = jar.remove(Cookie::build(session.cookie_name().to_string()).path("/"));
    Ok((jar, Json(json!({}))))
}
