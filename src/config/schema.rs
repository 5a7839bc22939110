//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::Deserialize;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// The single backend every proxied request goes to.
    pub backend: BackendConfig,

    /// Origin gate settings.
    pub cors: CorsConfig,

    /// Log level and traffic logging.
    pub logging: LoggingConfig,
}

impl ProxyConfig {
    /// Socket address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.listener.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., "http://api.internal:3000").
    pub url: String,

    /// Deadline for the whole backend exchange in seconds.
    pub timeout_secs: u64,

    /// TCP connect deadline in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

/// Who owns `Access-Control-Allow-Origin` / `-Credentials` on proxied responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorsAuthority {
    /// Backend values are stripped; the gate's values are written.
    #[default]
    Gate,
    /// Backend values are kept; the gate only fills gaps.
    Backend,
}

impl std::str::FromStr for CorsAuthority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gate" => Ok(Self::Gate),
            "backend" => Ok(Self::Backend),
            other => Err(format!("expected `gate` or `backend`, got `{}`", other)),
        }
    }
}

impl std::fmt::Display for CorsAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorsAuthority::Gate => f.write_str("gate"),
            CorsAuthority::Backend => f.write_str("backend"),
        }
    }
}

/// Origin gate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Exact-match origins. Empty means wildcard mode.
    pub allowed_origins: Vec<String>,

    /// Value of `Access-Control-Allow-Methods`.
    pub allow_methods: String,

    /// Value of `Access-Control-Allow-Headers`.
    pub allow_headers: String,

    pub authority: CorsAuthority,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_methods: "GET, POST, PUT, DELETE, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
            authority: CorsAuthority::Gate,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error, fatal, panic).
    pub level: String,

    /// Enable request/response traffic logging.
    pub traffic: bool,

    /// Cap on body bytes kept per traffic log record.
    pub max_body_bytes: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            traffic: true,
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}
