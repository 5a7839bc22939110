//! Configuration loading: defaults, then an optional TOML file, then the
//! environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// `path` is an optional TOML file; environment variables are applied on
/// top of it.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` resolves a variable name; tests pass a map instead of the real
/// process environment.
pub fn apply_env<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("HOST") {
        config.listener.host = v;
    }
    if let Some(v) = lookup("PORT") {
        config.listener.port = parse_num("PORT", &v)?;
    }
    if let Some(v) = lookup("BACKEND_API_URL") {
        config.backend.url = v;
    }
    if let Some(v) = lookup("BACKEND_TIMEOUT_SECS") {
        config.backend.timeout_secs = parse_num("BACKEND_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("BACKEND_CONNECT_TIMEOUT_SECS") {
        config.backend.connect_timeout_secs = parse_num("BACKEND_CONNECT_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("ALLOWED_ORIGINS") {
        config.cors.allowed_origins = split_list(&v);
    }
    if let Some(v) = lookup("CORS_ALLOW_METHODS") {
        config.cors.allow_methods = v;
    }
    if let Some(v) = lookup("CORS_ALLOW_HEADERS") {
        config.cors.allow_headers = v;
    }
    if let Some(v) = lookup("CORS_AUTHORITY") {
        config.cors.authority = v
            .parse()
            .map_err(|reason| ConfigError::Env { key: "CORS_AUTHORITY", reason })?;
    }
    if let Some(v) = lookup("LOG_LEVEL") {
        config.logging.level = v;
    }
    if let Some(v) = lookup("TRAFFIC_LOG") {
        config.logging.traffic = parse_bool("TRAFFIC_LOG", &v)?;
    }
    if let Some(v) = lookup("TRAFFIC_LOG_MAX_BODY_BYTES") {
        config.logging.max_body_bytes = parse_num("TRAFFIC_LOG_MAX_BODY_BYTES", &v)?;
    }
    Ok(())
}

fn parse_num<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        key,
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Env {
            key,
            reason: format!("expected a boolean, got `{}`", other),
        }),
    }
}

/// Comma-separated list; blank items are dropped so that an empty variable
/// means an empty list.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
