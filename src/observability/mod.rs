//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!
//! Traffic logger (http::middleware::traffic_log) uses:
//!     → dump.rs (inbound request in wire form)
//!     → capture.rs (pass-through response capture)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows through every traffic record
//! - Capture is observation-only; client bytes never change

pub mod capture;
pub mod dump;
pub mod logging;
