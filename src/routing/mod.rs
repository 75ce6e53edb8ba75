//! Routing module
//!
//! Provides the route table used by the dispatcher:
//! - Path patterns with literal and `:name` parameter segments
//! - An ordered list of (method, pattern, handler) routes, first match wins

mod matcher;
mod table;

pub use matcher::{Params, PathPattern};
pub use table::{Handler, RequestContext, Route, RouteTable};
