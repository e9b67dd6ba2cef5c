//! Router configuration.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::{Layer, ServiceBuilder};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    api_not_found, forbidden, get_reset_password_token, index, login, logout, me, profile,
    register_user, session_login, session_logout, status, unauthorized, update_password,
    AppState,
};
use super::middleware::{auth_gate, create_cors_layer};
use crate::auth::{AuthStrategy, ExcludedPaths, RequestGate};
use crate::config::Config;
use crate::Database;

/// Create the main router.
///
/// Everything under `/api/v1`, unknown paths included, runs behind `gate`;
/// the account routes do not. A trailing slash is trimmed before routing,
/// so `/api/v1/status/` and `/api/v1/status` reach the same handler.
pub fn create_router(app_state: Arc<AppState>, gate: RequestGate, cors_origins: &[String]) -> Router {
    let api_routes = Router::new()
        .route("/status", get(status))
        .route("/unauthorized", get(unauthorized))
        .route("/forbidden", get(forbidden))
        .route("/users/me", get(me))
        .route("/auth_session/login", post(session_login))
        .route("/auth_session/logout", delete(session_logout))
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(gate, auth_gate));

    let account_routes = Router::new()
        .route("/", get(index))
        .route("/users", post(register_user))
        .route("/sessions", post(login).delete(logout))
        .route("/profile", get(profile))
        .route(
            "/reset_password",
            post(get_reset_password_token).put(update_password),
        );

    let app = Router::new()
        .nest("/api/v1", api_routes)
        .merge(account_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state);

    // Route-level layers run after matching, so normalization has to wrap
    // the whole router.
    Router::new().fallback_service(NormalizePathLayer::trim_trailing_slash().layer(app))
}

/// Build the full application for `config` over `db`.
pub fn create_app(config: &Config, db: Database) -> Router {
    let strategy = AuthStrategy::from_kind(config.auth.kind, &db, &config.auth.session_name)
        .map(Arc::new);
    let gate = RequestGate::new(
        strategy.clone(),
        ExcludedPaths::new(&config.auth.excluded_paths),
    );
    let app_state = Arc::new(AppState::new(
        db,
        strategy,
        config.auth.user_session_cookie.clone(),
    ));

    create_router(app_state, gate, &config.web.cors_origins)
}
