//! HTTP server.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use super::router::create_app;
use crate::config::Config;
use crate::{Database, Result};

/// HTTP server for the API and account routes.
pub struct WebServer {
    /// Bind address.
    addr: SocketAddr,
    /// Fully layered application.
    router: Router,
}

impl WebServer {
    /// Create a server from configuration.
    ///
    /// Fails with a configuration error if the bind address is invalid.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let addr = config.server.socket_addr()?;
        tracing::info!(
            auth = %config.auth.kind,
            excluded_paths = config.auth.excluded_paths.len(),
            "Authentication configured"
        );

        Ok(Self {
            addr,
            router: create_app(config, db),
        })
    }

    /// Get the configured bind address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the server until it fails.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router).await?;
        Ok(())
    }

    /// Run the server in the background and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, self.router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
