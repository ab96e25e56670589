//! Where the frontend is shown.
//!
//! The shell starts the backend, then hands the frontend URI to a
//! [`DisplaySurface`] together with a [`ShutdownHook`]. The surface blocks
//! until the user closes it and runs the hook exactly once on the way out,
//! which stops the backend before the process exits.

mod headless;
#[cfg(feature = "webview")]
mod webview;

pub use headless::HeadlessSurface;
#[cfg(feature = "webview")]
pub use webview::WebviewSurface;

use crate::error::ShellError;

use host_core::lifecycle::{HostCoordinator, ServerDescriptor};

use log::{error, warn};
use tokio::runtime::Handle;
use url::Url;

pub trait DisplaySurface {
    /// Show `frontend_uri` and block until the surface closes.
    ///
    /// Implementations must call [`ShutdownHook::run`] before returning, or
    /// before the process exits if their event loop never returns.
    fn present(
        self: Box<Self>,
        frontend_uri: &Url,
        on_close: ShutdownHook,
    ) -> Result<(), ShellError>;
}

/// Surface chosen for this build: the native window when compiled with the
/// `webview` feature, headless otherwise.
pub fn default_surface() -> Box<dyn DisplaySurface> {
    #[cfg(feature = "webview")]
    {
        Box::new(WebviewSurface::default())
    }
    #[cfg(not(feature = "webview"))]
    {
        Box::new(HeadlessSurface)
    }
}

/// Stops the running backend when the surface closes.
///
/// Owns the descriptor, so the backend can be stopped through it only once.
/// A hook dropped without [`ShutdownHook::run`] (a surface failing early)
/// still stops the backend from its `Drop`.
pub struct ShutdownHook {
    backend: Option<(HostCoordinator, ServerDescriptor)>,
    backend_uri: Url,
    runtime: Handle,
}

impl ShutdownHook {
    pub(crate) fn new(
        coordinator: HostCoordinator,
        descriptor: ServerDescriptor,
        runtime: Handle,
    ) -> Self {
        Self {
            backend_uri: descriptor.backend_uri().clone(),
            backend: Some((coordinator, descriptor)),
            runtime,
        }
    }

    /// Runtime the backend is served on.
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn backend_uri(&self) -> &Url {
        &self.backend_uri
    }

    /// Gracefully stop the backend and wait for it.
    ///
    /// Must not be called from inside an async context; it blocks the
    /// calling thread on the backend runtime.
    pub fn run(mut self) -> Result<(), ShellError> {
        self.stop_backend()
    }

    fn stop_backend(&mut self) -> Result<(), ShellError> {
        let Some((coordinator, descriptor)) = self.backend.take() else {
            return Ok(());
        };

        self.runtime
            .block_on(coordinator.stop(descriptor))
            .map_err(|e| {
                error!("Backend did not stop cleanly: {e}");
                ShellError::from(e)
            })
    }
}

impl Drop for ShutdownHook {
    fn drop(&mut self) {
        if self.backend.is_none() {
            return;
        }

        warn!("Display surface closed without stopping the backend, stopping it now");

        if Handle::try_current().is_ok() {
            // Blocking here would panic inside the runtime; stop in the background.
            if let Some((coordinator, descriptor)) = self.backend.take() {
                self.runtime.spawn(async move {
                    if let Err(e) = coordinator.stop(descriptor).await {
                        error!("Backend did not stop cleanly: {e}");
                    }
                });
            }
            return;
        }

        // Failures are already logged by `stop_backend`.
        let _ = self.stop_backend();
    }
}
