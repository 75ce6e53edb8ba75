//! Route table module
//!
//! Routes are evaluated in insertion order and are never modified after
//! the table is built.

use hyper::Method;

use super::matcher::{Params, PathPattern};
use crate::clock::Clock;
use crate::error::ApiError;
use crate::http::Reply;

/// Request context passed to route handlers
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub params: &'a Params,
    pub clock: &'a dyn Clock,
}

/// Route handler signature
pub type Handler = fn(&RequestContext<'_>) -> Result<Reply, ApiError>;

/// A (method, pattern) pair bound to a handler
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: Handler,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Ordered route table
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route; earlier routes take precedence
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, handler: Handler) -> Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            handler,
        });
        self
    }

    /// Find the first route matching method and path
    pub fn find(&self, method: &Method, path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }
}
