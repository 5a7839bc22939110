//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging at the configured level
//! - Build the server, bind the listener, serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::path::Path;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, ProxyConfig};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::Shutdown;
use crate::observability::logging::{self, LogLevel};
use crate::security::cors::OriginPolicy;

/// Anything that stops the process before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Load config, start logging, and serve until SIGINT/SIGTERM.
pub async fn run(config_path: Option<&Path>) -> Result<(), StartupError> {
    let loaded = load_config(config_path);

    let raw_level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    let (level, fell_back) = LogLevel::parse_or_default(&raw_level);
    logging::init(level);
    if fell_back {
        warn_invalid_level(&raw_level);
    }

    let config = loaded?;
    serve(config).await
}

async fn serve(config: ProxyConfig) -> Result<(), StartupError> {
    let address = config.bind_address();
    let server = HttpServer::new(config)?;

    let cors_mode = match server.policy().origins() {
        OriginPolicy::Any => "wildcard".to_string(),
        OriginPolicy::AllowList(origins) => format!("allow-list ({} origins)", origins.len()),
    };
    tracing::info!(
        address = %address,
        backend = %server.forwarder().target(),
        cors = %cors_mode,
        authority = %server.config().cors.authority,
        traffic_log = server.config().logging.traffic,
        "Starting proxy server"
    );

    let listener = bind(address).await?;

    let shutdown = Shutdown::new();
    let _signals = shutdown.trigger_on_signal();

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}

fn warn_invalid_level(raw: &str) {
    tracing::warn!(level = %raw, "Invalid LOG_LEVEL, defaulting to 'info'");
}

async fn bind(address: String) -> Result<TcpListener, StartupError> {
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}
