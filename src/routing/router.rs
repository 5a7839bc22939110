//! Ordered route table.
//!
//! Routes are evaluated in the order given; the first whose matcher accepts
//! the request wins.

use axum::body::Body;
use axum::http::Request;

use crate::routing::matcher::{ExactPathMatcher, Matcher, PathPrefixMatcher};

/// What a matched request is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Liveness,
    Readiness,
    Proxy,
}

#[derive(Debug)]
pub struct Route {
    /// Route identifier for logging.
    pub name: &'static str,
    pub matcher: Box<dyn Matcher>,
    pub endpoint: Endpoint,
}

impl Route {
    pub fn new(name: &'static str, matcher: impl Matcher + 'static, endpoint: Endpoint) -> Self {
        Self {
            name,
            matcher: Box::new(matcher),
            endpoint,
        }
    }
}

/// Immutable, ordered list of routes.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Health endpoints first, then everything else to the proxy pipeline.
    pub fn standard() -> Self {
        Self::new(vec![
            Route::new("liveness", ExactPathMatcher::new("/healthz"), Endpoint::Liveness),
            Route::new("readiness", ExactPathMatcher::new("/ready"), Endpoint::Readiness),
            Route::new("proxy", PathPrefixMatcher::new("/"), Endpoint::Proxy),
        ])
    }

    /// First matching route, if any.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(req))
    }
}
