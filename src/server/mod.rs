// 服务器模块入口
// Server instance with an explicit start/stop lifecycle

pub mod connection;
pub mod listener;
pub mod signal;

// Rust 不允许 loop 作为模块名（关键字），改用 server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::AppState;
use crate::logger;
use listener::create_reusable_listener;
use server_loop::start_server_loop;

/// A configured but not yet listening server
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Bind `server.host:server.port` and spawn the accept loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> io::Result<RunningServer> {
        let addr = self
            .state
            .config
            .get_socket_addr()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = create_reusable_listener(addr)?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let active_connections = Arc::new(AtomicUsize::new(0));
        let task = tokio::spawn(start_server_loop(
            listener,
            Arc::clone(&self.state),
            active_connections,
            shutdown_rx,
        ));

        Ok(RunningServer {
            local_addr,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// Handle to a listening server; dropping it also stops the accept loop
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<bool>,
}

impl RunningServer {
    /// Address actually bound (resolves port 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, then wait for in-flight connections up to the drain timeout.
    ///
    /// Returns `true` when every connection finished in time.
    pub async fn stop(self) -> bool {
        // the loop may already be gone, in which case there is nothing to signal
        let _ = self.shutdown.send(true);

        match self.task.await {
            Ok(drained) => drained,
            Err(e) => {
                logger::log_error(&format!("Server loop terminated abnormally: {e}"));
                false
            }
        }
    }
}
