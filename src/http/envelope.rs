//! Response envelope types
//!
//! Every request produces a `Reply`: a status plus a JSON body that is
//! either a success object or an `{"error":{"message":...}}` envelope.

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;

/// Error envelope body: `{"error": {"message": "..."}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
            },
        }
    }

    pub fn into_value(self) -> Value {
        json!({ "error": { "message": self.error.message } })
    }
}

/// Status code and JSON body produced by the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    /// 200 OK with a serialized body
    pub fn ok<T: Serialize>(body: &T) -> Result<Self, ApiError> {
        Ok(Self {
            status: StatusCode::OK,
            body: serde_json::to_value(body)?,
        })
    }

    pub fn from_error(err: &ApiError) -> Self {
        Self {
            status: err.status(),
            body: err.envelope().into_value(),
        }
    }
}

impl From<ApiError> for Reply {
    fn from(err: ApiError) -> Self {
        Self::from_error(&err)
    }
}
