//! Request gate middleware.

use axum::{
    body::Body,
    extract::{FromRequestParts, OriginalUri, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{GateOutcome, RequestGate};
use crate::db::User;
use crate::web::error::ApiError;

/// Identity attached to a request extension by [`auth_gate`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Identity attached by the gate, if any.
///
/// Never rejects: routes outside the gate, or running without a strategy,
/// see `None`.
#[derive(Debug, Clone)]
pub struct OptionalCurrentUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalCurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user = parts.extensions.get::<CurrentUser>().map(|u| u.0.clone());
            Ok(OptionalCurrentUser(user))
        })
    }
}

/// Middleware running the [`RequestGate`] before the handler.
///
/// Excluded paths are matched against the full request path, not the
/// remainder left by `nest`.
pub async fn auth_gate(
    State(gate): State<RequestGate>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_string(),
        None => request.uri().path().to_string(),
    };

    match gate.evaluate(&path, request.headers()).await {
        Ok(GateOutcome::Allow) => next.run(request).await,
        Ok(GateOutcome::Authenticated(user)) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Ok(GateOutcome::Unauthorized) => ApiError::unauthorized("Unauthorized").into_response(),
        Ok(GateOutcome::Forbidden) => ApiError::forbidden("Forbidden").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
