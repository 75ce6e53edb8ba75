//! HTTP protocol layer module
//!
//! Response envelopes and the builders that turn them into hyper responses,
//! kept apart from routing and handler logic.

pub mod envelope;
pub mod response;

// Re-export commonly used types
pub use envelope::{ErrorBody, ErrorEnvelope, Reply};
pub use response::{build_500_response, build_json_response};
