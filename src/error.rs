//! Per-request error taxonomy.
//!
//! None of these reach the client verbatim: the forwarder maps all of them
//! to a generic 502 and logs the detail.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Backend unreachable, connection reset, protocol error.
    #[error("upstream transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    /// The backend did not answer within the configured deadline.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// The inbound request target could not be mapped onto the backend.
    #[error("cannot build upstream request: {0}")]
    Rewrite(#[from] axum::http::Error),
}
