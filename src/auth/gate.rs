//! Per-request authentication gate.

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::debug;

use crate::auth::paths::ExcludedPaths;
use crate::auth::strategy::AuthStrategy;
use crate::db::User;
use crate::Result;

/// Terminal decision for one request.
#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// No authentication applies to this request.
    Allow,
    /// The request carries a valid identity.
    Authenticated(User),
    /// No credential or session was presented (401).
    Unauthorized,
    /// A credential was presented but does not resolve to a user (403).
    Forbidden,
}

impl GateOutcome {
    /// Whether the request may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateOutcome::Allow | GateOutcome::Authenticated(_))
    }
}

/// Decides allow, 401 or 403 for each request.
#[derive(Debug, Clone)]
pub struct RequestGate {
    strategy: Option<Arc<AuthStrategy>>,
    excluded: Arc<ExcludedPaths>,
}

impl RequestGate {
    /// Create a gate. A `None` strategy lets every request through.
    pub fn new(strategy: Option<Arc<AuthStrategy>>, excluded: ExcludedPaths) -> Self {
        Self {
            strategy,
            excluded: Arc::new(excluded),
        }
    }

    /// The configured strategy, if any.
    pub fn strategy(&self) -> Option<&Arc<AuthStrategy>> {
        self.strategy.as_ref()
    }

    /// The excluded-path set.
    pub fn excluded(&self) -> &ExcludedPaths {
        &self.excluded
    }

    /// Evaluate a request by path and headers.
    ///
    /// `Err` only reports a store failure; the caller answers it with a 5xx.
    pub async fn evaluate(&self, path: &str, headers: &HeaderMap) -> Result<GateOutcome> {
        let Some(strategy) = self.strategy.as_deref() else {
            return Ok(GateOutcome::Allow);
        };

        if !strategy.require_auth(Some(path), &self.excluded) {
            debug!(path, "Gate: excluded path");
            return Ok(GateOutcome::Allow);
        }

        if strategy.extract_auth_signal(headers).is_none() {
            debug!(path, strategy = %strategy.kind(), "Gate: no credentials");
            return Ok(GateOutcome::Unauthorized);
        }

        match strategy.current_user(headers).await? {
            Some(user) => Ok(GateOutcome::Authenticated(user)),
            None => {
                debug!(path, strategy = %strategy.kind(), "Gate: credentials did not resolve");
                Ok(GateOutcome::Forbidden)
            }
        }
    }
}
