//! Request handler module
//!
//! Responsible for request dispatch and the API's route handlers.

pub mod dispatcher;
pub mod router;
pub mod routes;
pub mod users;

// Re-export main entry points
pub use dispatcher::Dispatcher;
pub use router::handle_request;
