//! API route handlers
//!
//! Each handler builds a success body or returns an `ApiError`; the
//! dispatcher owns the mapping from errors to status codes.

use hyper::Method;
use serde::{Deserialize, Serialize};

use super::users::find_user;
use crate::clock::iso_timestamp;
use crate::error::ApiError;
use crate::http::Reply;
use crate::routing::{RequestContext, RouteTable};

pub const WELCOME_MESSAGE: &str = "Welcome to our API!";

#[derive(Debug, Serialize)]
pub struct Welcome {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
    pub uptime: f64,
}

/// The application's route table
pub fn api_routes() -> RouteTable {
    RouteTable::new()
        .route(Method::GET, "/", welcome)
        .route(Method::GET, "/api/health", health)
        .route(Method::GET, "/api/users/:id", get_user)
}

/// GET /
pub fn welcome(_ctx: &RequestContext<'_>) -> Result<Reply, ApiError> {
    Reply::ok(&Welcome {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// GET /api/health
pub fn health(ctx: &RequestContext<'_>) -> Result<Reply, ApiError> {
    Reply::ok(&Health {
        status: "ok".to_string(),
        timestamp: iso_timestamp(&ctx.clock.now()),
        uptime: ctx.clock.uptime().as_secs_f64(),
    })
}

/// GET /api/users/:id
pub fn get_user(ctx: &RequestContext<'_>) -> Result<Reply, ApiError> {
    let id = ctx.params.get("id").unwrap_or_default();
    let user = find_user(id).ok_or(ApiError::ResourceNotFound("User"))?;
    Reply::ok(&user)
}
