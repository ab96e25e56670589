//! Handle to the running HTTP server.

use crate::error::shutdown::ShutdownError;

use common::ErrorLocation;

use std::io::Result as IoResult;
use std::net::SocketAddr;
use std::panic::Location;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Handle to the background task serving HTTP on the loopback listener.
///
/// # Lifecycle
///
/// [`ServerHandle::shutdown`] stops accepting connections, waits for
/// in-flight requests up to a grace period, then force-closes every
/// remaining connection and aborts the serve loop.
/// Dropping a handle that was never shut down signals a graceful shutdown
/// but does not wait for it.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    abort: CancellationToken,
    task: Option<JoinHandle<IoResult<()>>>,
}

impl ServerHandle {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown_tx: oneshot::Sender<()>,
        abort: CancellationToken,
        task: JoinHandle<IoResult<()>>,
    ) -> Self {
        Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            abort,
            task: Some(task),
        }
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the serve loop has already exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Gracefully stop the server and wait for the serve loop to exit.
    ///
    /// # Errors
    ///
    /// - [`ShutdownError::Timeout`] - connections were still open after `grace`; they were force-closed
    /// - [`ShutdownError::Serve`] - the serve loop had failed with an I/O error
    /// - [`ShutdownError::Join`] - the serve task panicked or was cancelled
    pub async fn shutdown(mut self, grace: Duration) -> Result<(), ShutdownError> {
        if let Some(shutdown_tx) = self.shutdown_tx.take()
            && shutdown_tx.send(()).is_err()
        {
            debug!("Serve loop on {} already exited", self.local_addr);
        }

        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        match timeout(grace, &mut task).await {
            Ok(Ok(Ok(()))) => {
                debug!("Serve loop on {} exited cleanly", self.local_addr);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(ShutdownError::Serve {
                message: format!("Server on {} failed: {e}", self.local_addr),
                location: ErrorLocation::from(Location::caller()),
            }),
            Ok(Err(e)) => Err(ShutdownError::Join {
                message: format!("Server task on {} did not complete: {e}", self.local_addr),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(_) => {
                warn!(
                    "Server on {} still busy after {grace:?}, closing remaining connections",
                    self.local_addr
                );
                self.abort.cancel();
                task.abort();
                let _ = task.await;
                Err(ShutdownError::Timeout {
                    message: format!(
                        "Graceful shutdown of {} exceeded {grace:?}",
                        self.local_addr
                    ),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            debug!(
                "Server handle for {} dropped without shutdown, signalling stop",
                self.local_addr
            );
            let _ = shutdown_tx.send(());
        }
    }
}
