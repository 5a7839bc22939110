//! CORS-gating reverse proxy library.
//!
//! Forwards every request to one fixed backend, enforces an origin
//! allow-list (or wildcard CORS), and optionally logs full request and
//! response traffic.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
