//! Proxy subsystem.
//!
//! # Data Flow
//! ```text
//! CORS-approved request
//!     → target.rs (rewrite scheme/authority/path onto the backend)
//!     → forwarder.rs (hyper client call with deadline)
//!     → backend response streamed back, or 502 on transport failure
//! ```

pub mod forwarder;
pub mod target;

pub use forwarder::{forward_handler, Forwarder};
pub use target::{BackendTarget, TargetError};
