//! Backend target: the single upstream every proxied request is sent to.
//!
//! Parsed once at startup and immutable afterwards.

use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::Uri;
use std::str::FromStr;
use url::Url;

/// Why a backend URL cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme `{0}` (only http is supported)")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("invalid authority: {0}")]
    Authority(#[from] axum::http::uri::InvalidUri),
}

/// A parsed backend base URL.
#[derive(Debug, Clone)]
pub struct BackendTarget {
    url: Url,
    authority: Authority,
    base_path: String,
    base_query: Option<String>,
}

impl BackendTarget {
    /// Parse an absolute `http` URL.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let url = Url::parse(raw.trim())?;

        if url.scheme() != "http" {
            return Err(TargetError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = url.host_str().ok_or(TargetError::MissingHost)?;
        let authority = match url.port() {
            Some(port) => Authority::from_str(&format!("{}:{}", host, port))?,
            None => Authority::from_str(host)?,
        };

        Ok(Self {
            base_path: url.path().to_string(),
            base_query: url.query().map(String::from),
            authority,
            url,
        })
    }

    /// Rewrite an inbound request target onto the backend.
    ///
    /// Scheme and authority come from the backend; the path is the backend
    /// base path joined with the request path, and the queries are merged.
    pub fn rewrite(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_paths(&self.base_path, inbound.path());
        let query = match (self.base_query.as_deref(), inbound.query()) {
            (Some(base), Some(q)) if !base.is_empty() && !q.is_empty() => Some(format!("{}&{}", base, q)),
            (Some(base), _) if !base.is_empty() => Some(base.to_string()),
            (_, Some(q)) if !q.is_empty() => Some(q.to_string()),
            _ => None,
        };

        let path_and_query = match query {
            Some(q) => PathAndQuery::from_str(&format!("{}?{}", path, q))?,
            None => PathAndQuery::from_str(&path)?,
        };

        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl std::fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Join two paths with exactly one `/` between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
