// Connection handling module
// Accepts a single TCP connection and serves it over HTTP/1.1

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::{AppState, PerformanceConfig};
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `shutdown` - Receiver flipped to `true` when the server is stopping
///
/// Returns `false` when the connection was rejected.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    shutdown: watch::Receiver<bool>,
) -> bool {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return false;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        shutdown,
    );
    true
}

/// Idle window after which a connection is asked to close.
///
/// With keep-alive on this is `keep_alive_timeout`; otherwise the single
/// request must arrive within `read_timeout`.
pub fn idle_timeout(perf: &PerformanceConfig) -> Duration {
    if perf.keep_alive_timeout > 0 {
        Duration::from_secs(perf.keep_alive_timeout)
    } else {
        Duration::from_secs(perf.read_timeout)
    }
}

/// Serve a single connection in a spawned task.
///
/// Every request restarts the idle timer. When it runs out, or shutdown
/// begins, the connection finishes its current request and closes; if it
/// is still open `write_timeout` seconds later it is dropped.
/// The connection counter is decremented when the task ends.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let perf = &state.config.performance;
        let idle = idle_timeout(perf);
        let drain_limit = Duration::from_secs(perf.write_timeout);

        let mut builder = http1::Builder::new();
        builder.keep_alive(perf.keep_alive_timeout > 0);

        // Milliseconds since `opened` at which the last request arrived
        let opened = Instant::now();
        let last_request = Arc::new(AtomicU64::new(0));

        let service_state = Arc::clone(&state);
        let service_activity = Arc::clone(&last_request);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let since_open = u64::try_from(opened.elapsed().as_millis()).unwrap_or(u64::MAX);
                service_activity.store(since_open, Ordering::Relaxed);
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );
        tokio::pin!(conn);

        let deadline = tokio::time::sleep(idle);
        tokio::pin!(deadline);

        let mut draining = false;
        let result = loop {
            tokio::select! {
                res = conn.as_mut() => break res,
                _ = shutdown.changed(), if !draining => {
                    draining = true;
                    conn.as_mut().graceful_shutdown();
                    deadline.as_mut().reset(Instant::now() + drain_limit);
                }
                () = &mut deadline => {
                    if draining {
                        logger::log_debug(&format!(
                            "Connection from {peer_addr} dropped, still open {}s after close was requested",
                            drain_limit.as_secs()
                        ));
                        break Ok(());
                    }

                    let idle_until = opened
                        + Duration::from_millis(last_request.load(Ordering::Relaxed))
                        + idle;
                    if idle_until > Instant::now() {
                        deadline.as_mut().reset(idle_until);
                    } else {
                        logger::log_debug(&format!(
                            "Connection from {peer_addr} idle for {}s, closing",
                            idle.as_secs()
                        ));
                        draining = true;
                        conn.as_mut().graceful_shutdown();
                        deadline.as_mut().reset(Instant::now() + drain_limit);
                    }
                }
            }
        };

        if let Err(err) = result {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
