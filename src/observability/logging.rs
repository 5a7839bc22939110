//! Structured logging.
//!
//! # Responsibilities
//! - Parse the configured log level
//! - Initialize the tracing subscriber
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level when set
//! - Unknown level names fall back to info; the caller logs a warning
//!   once the subscriber is up

use std::str::FromStr;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Minimum severity that gets emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse `raw`, falling back to `Info`.
    ///
    /// The second value is true when the fallback was taken.
    pub fn parse_or_default(raw: &str) -> (Self, bool) {
        match raw.parse() {
            Ok(level) => (level, false),
            Err(_) => (LogLevel::Info, true),
        }
    }

    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown log level `{0}`")]
pub struct UnknownLevel(String);

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            // tracing has no levels above error
            "error" | "fatal" | "panic" => Ok(LogLevel::Error),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// Install the global subscriber.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.as_filter().into()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
