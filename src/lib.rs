//! demo_api
//!
//! A small JSON HTTP API served with tokio and hyper. The interesting part is
//! the request dispatcher in [`handler::dispatcher`]: an ordered route table,
//! handlers returning `Result<Reply, ApiError>`, and a single place where
//! errors and panics become `{"error":{"message":...}}` envelopes.

pub mod clock;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use error::{ApiError, Result, StartupError};
