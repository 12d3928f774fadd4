use clap::{Parser, builder::BoolishValueParser};
use codeinsight_core::control::DispatcherConfig;
use codeinsight_core::embed::ollama::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use codeinsight_core::query::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOP_K};
use codeinsight_store::schema::DEFAULT_EMBEDDING_DIMENSIONS;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_NAMESPACE: &str = "codeinsight";
const DEFAULT_DB_DATABASE: &str = "graph";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "codeinsightd", version, about = "Code insight MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "CODEINSIGHT_DB_URI")]
    db_uri: Option<String>,

    #[arg(long, env = "CODEINSIGHT_DB_NAMESPACE", default_value = DEFAULT_DB_NAMESPACE)]
    db_namespace: String,

    #[arg(long, env = "CODEINSIGHT_DB_DATABASE", default_value = DEFAULT_DB_DATABASE)]
    db_database: String,

    #[arg(long, env = "CODEINSIGHT_DB_USERNAME")]
    db_username: Option<String>,

    #[arg(long, env = "CODEINSIGHT_DB_PASSWORD")]
    db_password: Option<String>,

    #[arg(long, env = "CODEINSIGHT_EMBED_URL", default_value = DEFAULT_BASE_URL)]
    embed_url: String,

    #[arg(long, env = "CODEINSIGHT_EMBED_MODEL", default_value = DEFAULT_MODEL)]
    embed_model: String,

    #[arg(
        long,
        env = "CODEINSIGHT_EMBED_DIMENSIONS",
        default_value_t = DEFAULT_EMBEDDING_DIMENSIONS
    )]
    embed_dimensions: usize,

    #[arg(long, env = "CODEINSIGHT_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    #[arg(long, env = "CODEINSIGHT_MAX_TOP_K", default_value_t = DEFAULT_MAX_TOP_K)]
    max_top_k: u32,

    #[arg(
        long,
        env = "CODEINSIGHT_QUERY_TIMEOUT_SECS",
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS
    )]
    query_timeout_secs: u64,

    #[arg(
        long = "stdio",
        env = "CODEINSIGHT_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "CODEINSIGHT_MCP_SERVE",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "CODEINSIGHT_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(long, env = "CODEINSIGHT_LOG", default_value = DEFAULT_LOG_FILTER)]
    log: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone, Debug)]
pub struct CodeInsightConfig {
    /// `None` selects the in-memory engine.
    pub db_uri: Option<String>,
    pub db_namespace: String,
    pub db_database: String,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
    pub embed_url: String,
    pub embed_model: String,
    pub embed_dimensions: usize,
    pub max_depth: u32,
    pub max_top_k: u32,
    pub query_timeout: Option<Duration>,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub log_filter: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl CodeInsightConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    pub fn db_endpoint(&self) -> &str {
        self.db_uri.as_deref().unwrap_or("mem://")
    }

    pub const fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig::new()
            .with_max_depth(self.max_depth)
            .with_max_top_k(self.max_top_k)
            .with_timeout(self.query_timeout)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn require_text(name: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidSetting { name, value });
    }
    Ok(value)
}

fn require_positive(name: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidSetting {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

impl TryFrom<CliArgs> for CodeInsightConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let db_uri = non_blank(args.db_uri);
        let db_username = non_blank(args.db_username);
        let db_password = non_blank(args.db_password);

        if db_uri.is_some() {
            if db_username.is_none() {
                return Err(ConfigError::MissingSetting("CODEINSIGHT_DB_USERNAME"));
            }
            if db_password.is_none() {
                return Err(ConfigError::MissingSetting("CODEINSIGHT_DB_PASSWORD"));
            }
        }

        if args.embed_dimensions == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "CODEINSIGHT_EMBED_DIMENSIONS",
                value: args.embed_dimensions.to_string(),
            });
        }

        if EnvFilter::try_new(&args.log).is_err() {
            return Err(ConfigError::InvalidSetting {
                name: "CODEINSIGHT_LOG",
                value: args.log,
            });
        }

        let query_timeout = if args.query_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(args.query_timeout_secs))
        };

        Ok(Self {
            db_uri,
            db_namespace: require_text("CODEINSIGHT_DB_NAMESPACE", args.db_namespace)?,
            db_database: require_text("CODEINSIGHT_DB_DATABASE", args.db_database)?,
            db_username,
            db_password,
            embed_url: require_text("CODEINSIGHT_EMBED_URL", args.embed_url)?,
            embed_model: require_text("CODEINSIGHT_EMBED_MODEL", args.embed_model)?,
            embed_dimensions: args.embed_dimensions,
            max_depth: require_positive("CODEINSIGHT_MAX_DEPTH", args.max_depth)?,
            max_top_k: require_positive("CODEINSIGHT_MAX_TOP_K", args.max_top_k)?,
            query_timeout,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            log_filter: args.log,
        })
    }
}
