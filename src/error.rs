//! Error types
//!
//! `ApiError` is the request-level taxonomy returned by route handlers and
//! mapped to an HTTP status by the dispatcher. `StartupError` covers
//! everything that can go wrong before the first connection is accepted.

use hyper::StatusCode;
use thiserror::Error;

use crate::http::ErrorEnvelope;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No route matched the method and path
    #[error("Not Found")]
    NotFound,

    /// The route matched but the entity it names does not exist
    #[error("{0} not found")]
    ResourceNotFound(&'static str),

    /// Unexpected fault inside a handler. The message is passed to the
    /// client as-is.
    #[error("{message}")]
    Internal {
        status: Option<StatusCode>,
        message: String,
    },
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Internal {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { status, .. } => status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err.to_string())
    }
}

/// Failures while loading configuration and binding the listener
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
