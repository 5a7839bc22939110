//! Proxy pipeline middleware.
//!
//! ```text
//! traffic_log (optional, outermost)
//!     → origin_gate (403 / preflight short-circuit / CORS headers)
//!     → proxy::forward_handler
//! ```

pub mod origin_gate;
pub mod traffic_log;

pub use origin_gate::origin_gate;
pub use traffic_log::{traffic_log, TrafficLog};
