// Application state module
// Shared, read-only request-handling state plus cached config flags

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::clock::SystemClock;
use crate::handler::Dispatcher;

/// Application state
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    /// Create `AppState` serving the API routes, with uptime counted from now
    pub fn new(config: &Config) -> Self {
        Self::with_dispatcher(config, Dispatcher::with_api_routes(SystemClock::start()))
    }

    pub fn with_dispatcher(config: &Config, dispatcher: Dispatcher) -> Self {
        Self {
            config: config.clone(),
            dispatcher,
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }
}
