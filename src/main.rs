//! CORS-gating reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                   CORS PROXY                      │
//!     Client Request    │  ┌──────────┐   ┌──────────┐                      │
//!     ──────────────────┼─▶│  axum    │──▶│ routing  │──▶ /healthz, /ready  │
//!                       │  │  server  │   │  table   │                      │
//!                       │  └──────────┘   └────┬─────┘                      │
//!                       │                      ▼                            │
//!                       │  ┌──────────┐   ┌──────────┐   ┌──────────┐       │
//!     Client Response   │  │ traffic  │──▶│  origin  │──▶│ forwarder│───────┼──▶ Backend
//!     ◀─────────────────┼──│   log    │◀──│   gate   │◀──│ (hyper)  │◀──────┼───
//!                       │  └──────────┘   └──────────┘   └──────────┘       │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from an optional TOML file (`--config`) overlaid with
//! environment variables (`BACKEND_API_URL`, `PORT`, `LOG_LEVEL`,
//! `ALLOWED_ORIGINS`, ...).

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cors-proxy")]
#[command(about = "Reverse proxy with CORS origin gating and traffic logging", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cors_proxy::lifecycle::run(cli.config.as_deref()).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            ExitCode::FAILURE
        }
    }
}
