//! Account views: registration, login sessions stored on the user record,
//! profile and password reset.
//!
//! These routes sit outside the request gate. The session id travels in the
//! `user_session_cookie` cookie.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::info;

use crate::db::User;
use crate::web::dto::{
    CredentialsForm, EmailMessage, MessageResponse, ProfileResponse, ResetPasswordForm,
    ResetRequestForm, ResetTokenResponse,
};
use crate::web::error::ApiError;
use crate::GateError;

use super::AppState;

async fn user_from_cookie(state: &AppState, jar: &CookieJar) -> Result<Option<User>, ApiError> {
    let session_id = jar.get(&state.user_session_cookie).map(|c| c.value());
    Ok(state.lifecycle.resolve_session(session_id).await?)
}

/// POST /users - Register a new account.
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (form.email(), form.password()) else {
        return Err(ApiError::bad_request("email and password are required"));
    };

    match state.lifecycle.register(email, password).await {
        Ok(user) => Ok(Json(EmailMessage::new(user.email, "user created")).into_response()),
        Err(GateError::AlreadyExists(_)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::new("email already registered")),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// POST /sessions - Log in and set the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Json<EmailMessage>), ApiError> {
    let (Some(email), Some(password)) = (form.email(), form.password()) else {
        return Err(ApiError::unauthorized("Unauthorized"));
    };

    if !state.lifecycle.valid_login(email, password).await? {
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let session_id = state
        .lifecycle
        .create_session(email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    info!(email = %email, "User logged in");

    let cookie = Cookie::build((state.user_session_cookie.clone(), session_id)).path("/");
    Ok((jar.add(cookie), Json(EmailMessage::new(email, "logged in"))))
}

/// DELETE /sessions - Log out and redirect home.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let user = user_from_cookie(&state, &jar)
        .await?
        .ok_or_else(|| ApiError::forbidden("Forbidden"))?;

    state.lifecycle.destroy_session(user.id).await?;
    info!(user_id = user.id, "User logged out");

    let jar = jar.remove(Cookie::build(state.user_session_cookie.clone()).path("/"));
    Ok((jar, Redirect::to("/")))
}

/// GET /profile - Email of the logged-in user.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = user_from_cookie(&state, &jar)
        .await?
        .ok_or_else(|| ApiError::forbidden("Forbidden"))?;

    Ok(Json(ProfileResponse { email: user.email }))
}

/// POST /reset_password - Issue a password-reset token.
pub async fn get_reset_password_token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResetRequestForm>,
) -> Result<Json<ResetTokenResponse>, ApiError> {
    let email = form
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::forbidden("Forbidden"))?;

    match state.lifecycle.issue_reset_token(&email).await {
        Ok(reset_token) => Ok(Json(ResetTokenResponse { email, reset_token })),
        Err(GateError::NotFound(_)) => Err(ApiError::forbidden("Forbidden")),
        Err(e) => Err(e.into()),
    }
}

/// PUT /reset_password - Redeem a reset token and set a new password.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Json<EmailMessage>, ApiError> {
    let (Some(email), Some(reset_token), Some(new_password)) =
        (form.email, form.reset_token, form.new_password)
    else {
        return Err(ApiError::forbidden("Forbidden"));
    };

    match state
        .lifecycle
        .redeem_reset_token(&reset_token, &new_password)
        .await
    {
        Ok(()) => Ok(Json(EmailMessage::new(email, "Password updated"))),
        Err(GateError::NotFound(_)) => Err(ApiError::forbidden("Forbidden")),
        Err(e) => Err(e.into()),
    }
}
