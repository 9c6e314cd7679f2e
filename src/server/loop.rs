// Server loop module
// Accepts connections until stop is requested, then drains what is in flight

use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop until `shutdown` flips to `true` or its sender is dropped.
///
/// After the loop ends the listener is closed and in-flight connections get
/// `performance.shutdown_timeout` seconds to finish. Returns `true` when every
/// connection closed within that window.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) -> bool {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    logger::log_shutdown_requested();
    drop(listener);

    let drain = Duration::from_secs(state.config.performance.shutdown_timeout);
    let drained = tokio::time::timeout(drain, graceful.shutdown()).await.is_ok();
    logger::log_drain_complete(drained, active_connections.load(Ordering::SeqCst));
    drained
}
