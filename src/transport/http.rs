//! HTTP transport with Streamable HTTP support for the MCP server.
//!
//! Serves the MCP endpoint and, when configured, the prompt proxy route on
//! the same listener.

use crate::context::ServerContext;
use crate::error::{DbError, DbResult};
use crate::mcp::ProfileService;
use crate::proxy::{PromptProxy, handle_prompt};
use crate::transport::{Transport, wait_for_signal};
use axum::routing::post;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Graceful shutdown window once a signal arrives. Streaming connections
/// can otherwise keep the server alive indefinitely.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport implementation with Streamable HTTP support.
pub struct HttpTransport {
    ctx: Arc<ServerContext>,
    host: String,
    port: u16,
    /// MCP endpoint path
    endpoint: String,
    /// Prompt proxy and the path it is mounted on
    proxy: Option<(Arc<PromptProxy>, String)>,
}

impl HttpTransport {
    pub fn new(
        ctx: Arc<ServerContext>,
        host: impl Into<String>,
        port: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            host: host.into(),
            port,
            endpoint: endpoint.into(),
            proxy: None,
        }
    }

    /// Mount the prompt proxy at `path`.
    pub fn with_proxy(mut self, proxy: Arc<PromptProxy>, path: impl Into<String>) -> Self {
        self.proxy = Some((proxy, path.into()));
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn proxy_path(&self) -> Option<&str> {
        self.proxy.as_ref().map(|(_, path)| path.as_str())
    }

    /// Build the axum router for this transport.
    pub fn router(&self) -> axum::Router {
        let ctx = self.ctx.clone();
        let service = StreamableHttpService::new(
            move || Ok(ProfileService::new(ctx.clone())),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service doesn't support the root path
        let app = if self.endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&self.endpoint, service)
        };

        match &self.proxy {
            Some((proxy, path)) => {
                let route = axum::Router::new()
                    .route(path, post(handle_prompt))
                    .with_state(proxy.clone());
                app.merge(route)
            }
            None => app,
        }
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        info!("Starting MCP server with HTTP transport on {}", bind_addr);

        let app = self.router();

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::connection(
                format!("Failed to bind to {}: {}", bind_addr, e),
                "Check that the port is available",
            )
        })?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");
        if let Some(path) = self.proxy_path() {
            info!(path = %path, "Prompt proxy ready");
        }

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();

        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(DbError::internal(format!("HTTP server error: {}", e)));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );

                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        info!("Closing database connections");
        self.ctx.executor.close().await;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
