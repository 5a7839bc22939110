//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (tracing, request ID)
//! - Dispatch each request through the ordered route table
//! - Build the proxy pipeline (traffic log → origin gate → forwarder)
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::State,
    http::{header::InvalidHeaderValue, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::health;
use crate::http::middleware::{origin_gate, traffic_log, TrafficLog};
use crate::proxy::{forward_handler, BackendTarget, Forwarder, TargetError};
use crate::routing::{Endpoint, Router as RouteTable};
use crate::security::cors::CorsPolicy;

/// Error building the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("backend target: {0}")]
    Target(#[from] TargetError),

    #[error("CORS header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    /// Traffic log → origin gate → forwarder.
    pub pipeline: Router,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    policy: Arc<CorsPolicy>,
    forwarder: Arc<Forwarder>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let target = BackendTarget::parse(&config.backend.url)?;
        let policy = Arc::new(CorsPolicy::from_config(&config.cors)?);
        let forwarder = Arc::new(Forwarder::from_config(target, &config.backend));

        let state = AppState {
            routes: Arc::new(RouteTable::standard()),
            pipeline: Self::build_pipeline(&config, policy.clone(), forwarder.clone()),
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            policy,
            forwarder,
        })
    }

    /// Proxy pipeline. Layers added last run first.
    fn build_pipeline(config: &ProxyConfig, policy: Arc<CorsPolicy>, forwarder: Arc<Forwarder>) -> Router {
        let pipeline = Router::new()
            .fallback(forward_handler)
            .with_state(forwarder)
            .layer(middleware::from_fn_with_state(policy, origin_gate));

        if config.logging.traffic {
            pipeline.layer(middleware::from_fn_with_state(
                TrafficLog::from_config(&config.logging),
                traffic_log,
            ))
        } else {
            pipeline
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.forwarder.target(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Route each request through the ordered table; first match wins.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let endpoint = state.routes.match_request(&request).map(|route| {
        tracing::debug!(route = route.name, path = %request.uri().path(), "Route matched");
        route.endpoint
    });

    match endpoint {
        Some(Endpoint::Liveness) => health::liveness().await.into_response(),
        Some(Endpoint::Readiness) => health::readiness().await.into_response(),
        Some(Endpoint::Proxy) => match state.pipeline.oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        },
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
