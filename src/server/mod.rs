// Server module entry point
// Server startup, connection handling and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::clock::SystemClock;
use crate::config::{AppState, Config};
use crate::error::StartupError;
use crate::handler::Dispatcher;
use crate::logger;

// Re-export commonly used items
pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;

/// Bind the configured address and serve until a shutdown signal arrives
///
/// `clock` should be started as early as possible so uptime covers the
/// whole process lifetime.
pub async fn run(cfg: Config, clock: SystemClock) -> Result<(), StartupError> {
    let addr = cfg.socket_addr()?;
    let listener = create_reusable_listener(addr)?;

    let state = Arc::new(AppState::with_dispatcher(
        &cfg,
        Dispatcher::with_api_routes(clock),
    ));
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &cfg);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    signal::spawn_shutdown_listener(shutdown_tx);

    start_server_loop(listener, state, active_connections, shutdown_rx).await;
    Ok(())
}
