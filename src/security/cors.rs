//! Origin gate policy.
//!
//! Decides, from the `Origin` request header alone, whether a request may
//! proceed and which CORS headers its response carries. The middleware in
//! `http::middleware::origin_gate` applies the decision.
//!
//! # Modes
//! - Allow-list: exact string match. A match echoes the origin and allows
//!   credentials; anything else (including a missing header) is denied.
//! - Wildcard (empty allow-list): every request passes with
//!   `Access-Control-Allow-Origin: *` and no credentials header.

use axum::http::header::{
    self, HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use std::collections::HashSet;

use crate::config::{CorsAuthority, CorsConfig};

/// Which origins are allowed.
#[derive(Debug, Clone)]
pub enum OriginPolicy {
    /// No allow-list configured.
    Any,
    /// Exact-match set.
    AllowList(HashSet<String>),
}

/// Outcome of checking one request's origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// Wildcard mode.
    Wildcard,
    /// Origin is on the allow-list; echo it back.
    Echo(HeaderValue),
    /// Origin is not allowed.
    Denied,
}

/// Immutable CORS policy shared by all requests.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: OriginPolicy,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    authority: CorsAuthority,
}

impl CorsPolicy {
    pub fn new(
        origins: OriginPolicy,
        allow_methods: HeaderValue,
        allow_headers: HeaderValue,
        authority: CorsAuthority,
    ) -> Self {
        Self {
            origins,
            allow_methods,
            allow_headers,
            authority,
        }
    }

    /// Build the policy from validated configuration.
    pub fn from_config(config: &CorsConfig) -> Result<Self, header::InvalidHeaderValue> {
        let origins = if config.allowed_origins.is_empty() {
            OriginPolicy::Any
        } else {
            OriginPolicy::AllowList(
                config
                    .allowed_origins
                    .iter()
                    .map(|o| o.trim().to_string())
                    .collect(),
            )
        };

        Ok(Self::new(
            origins,
            HeaderValue::from_str(&config.allow_methods)?,
            HeaderValue::from_str(&config.allow_headers)?,
            config.authority,
        ))
    }

    pub fn origins(&self) -> &OriginPolicy {
        &self.origins
    }

    /// Check the request's `Origin` header value.
    pub fn evaluate(&self, origin: Option<&HeaderValue>) -> OriginDecision {
        match &self.origins {
            OriginPolicy::Any => OriginDecision::Wildcard,
            OriginPolicy::AllowList(allowed) => {
                let value = origin.and_then(|v| v.to_str().ok()).unwrap_or_default();
                match origin {
                    Some(header) if allowed.contains(value) => OriginDecision::Echo(header.clone()),
                    _ => OriginDecision::Denied,
                }
            }
        }
    }

    /// Write the CORS headers for an allowed request onto its response.
    ///
    /// With gate authority, any allow-origin/credentials values the backend
    /// set are replaced. With backend authority, only missing headers are
    /// filled in.
    pub fn apply(&self, decision: &OriginDecision, headers: &mut HeaderMap) {
        let allow_origin = match decision {
            OriginDecision::Wildcard => HeaderValue::from_static("*"),
            OriginDecision::Echo(origin) => origin.clone(),
            OriginDecision::Denied => return,
        };

        let mut values = vec![
            (ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin),
            (ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone()),
            (ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone()),
        ];
        if matches!(decision, OriginDecision::Echo(_)) {
            values.push((ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true")));
        }

        match self.authority {
            CorsAuthority::Gate => {
                headers.remove(ACCESS_CONTROL_ALLOW_ORIGIN);
                headers.remove(ACCESS_CONTROL_ALLOW_CREDENTIALS);
                for (name, value) in values {
                    headers.insert(name, value);
                }
            }
            CorsAuthority::Backend => {
                for (name, value) in values {
                    headers.entry(name).or_insert(value);
                }
            }
        }

        if matches!(decision, OriginDecision::Echo(_)) {
            headers.append(header::VARY, HeaderValue::from_static("origin"));
        }
    }
}
