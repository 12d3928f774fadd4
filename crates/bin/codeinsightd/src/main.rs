//! Daemon entry point for the code-insight MCP server.
//!
//! Loads configuration from the environment, connects the graph store and the
//! embedding service, and serves the query tools over stdio or HTTP.

mod config;

use std::sync::Arc;

use codeinsight_core::control::ToolDispatcher;
use codeinsight_core::embed::OllamaEmbedder;
use codeinsight_core::store::SurrealGraphStore;
use codeinsight_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::CodeInsightConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = CodeInsightConfig::from_args()?;
    init_tracing(&config)?;

    let db = connect(&config).await?;
    let store = SurrealGraphStore::new(db);
    let embedder = OllamaEmbedder::new(
        &config.embed_url,
        &config.embed_model,
        config.embed_dimensions,
    );
    let dispatcher =
        Arc::new(ToolDispatcher::new(store, embedder).with_config(config.dispatcher_config()));

    if config.enable_stdio {
        info!("serving MCP over stdio");
        serve_stdio(dispatcher.clone()).await?;
    } else if config.mcp_serve {
        serve_streamable_http(
            dispatcher.clone(),
            McpHttpServerConfig::new(config.mcp_http_addr),
        )
        .await?;
    } else {
        warn!("no transport enabled; set CODEINSIGHT_STDIO or CODEINSIGHT_MCP_SERVE");
    }

    match Arc::try_unwrap(dispatcher) {
        Ok(dispatcher) => dispatcher.shutdown(),
        Err(shared) => warn!(
            holders = Arc::strong_count(&shared),
            "tool dispatcher still shared at exit"
        ),
    }
    Ok(())
}

/// Logs go to stderr so stdio MCP framing on stdout stays clean.
fn init_tracing(config: &CodeInsightConfig) -> Result<(), BoxError> {
    let filter = EnvFilter::try_new(&config.log_filter)?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init()?;
    Ok(())
}

async fn connect(config: &CodeInsightConfig) -> Result<Surreal<Any>, surrealdb::Error> {
    let endpoint = config.db_endpoint();
    let db = any::connect(endpoint).await?;

    if let (Some(username), Some(password)) =
        (config.db_username.as_ref(), config.db_password.as_ref())
    {
        db.signin(Root {
            username: username.as_str(),
            password: password.as_str(),
        })
        .await?;
    }

    db.use_ns(&config.db_namespace)
        .use_db(&config.db_database)
        .await?;
    info!(
        in_memory = config.db_uri.is_none(),
        namespace = %config.db_namespace,
        database = %config.db_database,
        "connected to graph store"
    );
    Ok(db)
}
