//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin allow-list decision, response CORS headers)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-For)
//!     → Pass to the backend
//! ```
//!
//! # Design Decisions
//! - Fail closed: an origin not on a configured allow-list is rejected
//! - Exact string comparison only, no patterns
//! - Policy is pure and immutable; middleware applies it

pub mod cors;
pub mod headers;
