//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Backend URL must be usable as a forwarding target
//! - Validate value ranges (timeouts > 0)
//! - Allow-list entries and CORS header values must be well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderValue;

use crate::config::schema::ProxyConfig;
use crate::proxy::target::BackendTarget;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("backend.url: {0}")]
    BackendUrl(String),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("cors.allowed_origins[{index}] is empty")]
    EmptyOrigin { index: usize },

    #[error("cors.allowed_origins[{index}] is `*`; leave the list empty for wildcard mode")]
    WildcardOrigin { index: usize },

    #[error("{field} is not a valid header value")]
    HeaderValue { field: &'static str },
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = BackendTarget::parse(&config.backend.url) {
        errors.push(ValidationError::BackendUrl(e.to_string()));
    }

    if config.backend.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "backend.timeout_secs" });
    }
    if config.backend.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "backend.connect_timeout_secs" });
    }

    for (index, origin) in config.cors.allowed_origins.iter().enumerate() {
        match origin.trim() {
            "" => errors.push(ValidationError::EmptyOrigin { index }),
            "*" => errors.push(ValidationError::WildcardOrigin { index }),
            _ => {}
        }
    }

    if HeaderValue::from_str(&config.cors.allow_methods).is_err() {
        errors.push(ValidationError::HeaderValue { field: "cors.allow_methods" });
    }
    if HeaderValue::from_str(&config.cors.allow_headers).is_err() {
        errors.push(ValidationError::HeaderValue { field: "cors.allow_headers" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
