//! Health endpoints.
//!
//! Both are static: they report that the process is serving, with no
//! backend dependency check.

use axum::http::StatusCode;
use axum::response::IntoResponse;

pub const LIVENESS_BODY: &str = "OK";
pub const READINESS_BODY: &str = "Ready";

/// `/healthz`
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, LIVENESS_BODY)
}

/// `/ready`
pub async fn readiness() -> impl IntoResponse {
    (StatusCode::OK, READINESS_BODY)
}
