//! Request identification.
//!
//! # Responsibilities
//! - Name the request ID header shared by the layers and the traffic log
//! - Read the ID back out of a request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing (outermost layer)
//! - A client-supplied ID is kept, otherwise a UUID v4 is generated

use axum::http::{HeaderMap, HeaderName};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The request ID, or `"unknown"` when the layer did not run.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
