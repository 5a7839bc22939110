//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace layer)
//!     → routing table (health endpoints first, then proxy)
//!     → middleware/traffic_log.rs (optional request/response capture)
//!     → middleware/origin_gate.rs (CORS decision, preflight)
//!     → proxy::forwarder (backend call)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
