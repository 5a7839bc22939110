//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (ordered route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: matched Endpoint or NoMatch
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins, in declaration order

pub mod matcher;
pub mod router;

pub use router::{Endpoint, Route, Router};
