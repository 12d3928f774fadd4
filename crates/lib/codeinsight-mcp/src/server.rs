//! MCP server runners for code-insight.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use codeinsight_core::control::ToolDispatcher;
use codeinsight_core::embed::Embedder;
use codeinsight_core::store::GraphStore;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::{info, warn};

use crate::{CodeInsightMcp, http};

/// Default listen address for the HTTP transports.
pub const DEFAULT_HTTP_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4020);

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }

    #[must_use]
    pub const fn with_sse_retry(mut self, sse_retry: Option<Duration>) -> Self {
        self.sse_retry = sse_retry;
        self
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HTTP_ADDR)
    }
}

/// Serves the MCP server over stdio until the client disconnects.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<S: GraphStore, E: Embedder>(
    dispatcher: Arc<ToolDispatcher<S, E>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = CodeInsightMcp::with_dispatcher(dispatcher);
    let (stdin, stdout) = stdio();
    let running = serve_server(service, (stdin, stdout)).await?;
    let reason = running.waiting().await?;
    info!(?reason, "MCP stdio session ended");
    Ok(())
}

/// Builds the HTTP application: `/health`, the MCP endpoint at `/mcp`, and
/// the JSON tool routes under `/tools`.
pub fn http_app<S: GraphStore, E: Embedder>(
    dispatcher: Arc<ToolDispatcher<S, E>>,
    config: &McpHttpServerConfig,
) -> Router {
    let service_dispatcher = dispatcher.clone();
    let service: StreamableHttpService<CodeInsightMcp<S, E>, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(CodeInsightMcp::with_dispatcher(service_dispatcher.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                sse_retry: config.sse_retry,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service)
        .merge(http::router(dispatcher))
}

/// Serves MCP over streamable HTTP alongside the JSON tool routes until
/// Ctrl-C is received.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http<S: GraphStore, E: Embedder>(
    dispatcher: Arc<ToolDispatcher<S, E>>,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = http_app(dispatcher, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("code-insight listening on {}", config.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("code-insight HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
