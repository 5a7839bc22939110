//! Proxy forwarder.
//!
//! # Responsibilities
//! - Rewrite the request target onto the backend
//! - Relay method, path, query, headers and body
//! - Relay the backend response (status, headers, streamed body)
//! - Map transport failures and timeouts to 502
//!
//! # Design Decisions
//! - One pooled hyper client, built at startup
//! - Backend HTTP error statuses pass through untouched
//! - Dropping the handler future (client gone) drops the backend call

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Response, StatusCode, Version},
    response::IntoResponse,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BackendConfig;
use crate::error::ProxyError;
use crate::proxy::target::BackendTarget;
use crate::security::headers::{append_forwarded_for, strip_hop_by_hop};

/// Body returned to the client on any transport-level failure.
pub const PROXY_ERROR_BODY: &str = "Proxy error";

/// Forwards requests to the single configured backend.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    target: BackendTarget,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(target: BackendTarget, timeout: Duration, connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            target,
            timeout,
        }
    }

    pub fn from_config(target: BackendTarget, config: &BackendConfig) -> Self {
        Self::new(
            target,
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    pub fn target(&self) -> &BackendTarget {
        &self.target
    }

    /// Send `request` to the backend and return its response.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let client_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let (mut parts, body) = request.into_parts();
        parts.uri = self.target.rewrite(&parts.uri)?;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        if let Some(ip) = client_addr {
            append_forwarded_for(&mut parts.headers, ip);
        }

        let upstream = Request::from_parts(parts, body);
        let response: Response<hyper::body::Incoming> =
            match tokio::time::timeout(self.timeout, self.client.request(upstream)).await {
                Ok(result) => result?,
                Err(_) => return Err(ProxyError::Timeout(self.timeout)),
            };

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Terminal handler of the proxy pipeline.
pub async fn forward_handler(
    State(forwarder): State<Arc<Forwarder>>,
    request: Request<Body>,
) -> Response<Body> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(method = %method, path = %path, "Forwarding request");

    match forwarder.forward(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Proxy error");
            (StatusCode::BAD_GATEWAY, PROXY_ERROR_BODY).into_response()
        }
    }
}
