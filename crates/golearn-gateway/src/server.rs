//! HTTP server lifecycle

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::routes::create_router;
use crate::state::AppState;

/// Serves the API and UI until cancelled
pub struct GatewayServer {
    bind_addr: String,
    router: Router,
}

impl GatewayServer {
    pub fn new(state: AppState, bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            router: create_router(state),
        }
    }

    /// Bind and serve; in-flight requests finish after `cancel` fires
    pub async fn start(self, cancel: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.bind_addr))?;
        let local_addr = listener.local_addr().context("Failed to read local address")?;
        info!("golearn listening on http://{}", local_addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .context("HTTP server error")?;

        info!("golearn server stopped");
        Ok(())
    }
}
