//! Origin gate middleware.
//! Enforces the CORS allow-list in front of the forwarder.

use axum::{
    body::Body,
    extract::State,
    http::{header::ORIGIN, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::security::cors::{CorsPolicy, OriginDecision};

pub const DENIED_BODY: &str = "CORS origin denied";

pub async fn origin_gate(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let decision = policy.evaluate(request.headers().get(ORIGIN));

    if decision == OriginDecision::Denied {
        tracing::warn!(
            origin = ?request.headers().get(ORIGIN),
            method = %request.method(),
            path = %request.uri().path(),
            "CORS origin denied"
        );
        return (StatusCode::FORBIDDEN, DENIED_BODY).into_response();
    }

    // Preflight never reaches the backend.
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    policy.apply(&decision, response.headers_mut());
    response
}
