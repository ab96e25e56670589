//! Ties the embedded server to the shell's lifetime.
//!
//! # State machine
//!
//! ```text
//! Uninitialized -> Starting -> Running -> Stopping -> Stopped
//!                     |                                  ^
//!                     +---------- start failed ----------+
//! ```
//!
//! `Stopped` is terminal: restarting the backend requires a new process.
//! `Starting -> Running` happens once the listener is bound and the accept
//! loop has been spawned, without waiting for the first request.

mod descriptor;
pub mod readiness;

pub use descriptor::ServerDescriptor;

use crate::config::{HostConfig, ServeMode};
use crate::error::HostError;
use crate::error::lifecycle::LifecycleError;
use crate::error::startup::StartupError;
use crate::{BACKEND_BASE_URL, ports, server};

use common::ErrorLocation;
use models::MetadataRecordBuilder;

use std::panic::Location;
use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::watch;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Starts and stops the embedded backend for one shell session.
///
/// Cloning shares the same state; every clone sees the same transitions.
#[derive(Clone)]
pub struct HostCoordinator {
    config: Arc<HostConfig>,
    state: Arc<watch::Sender<LifecycleState>>,
}

impl HostCoordinator {
    pub fn new(config: HostConfig) -> Self {
        let (state, _) = watch::channel(LifecycleState::Uninitialized);
        Self {
            config: Arc::new(config),
            state: Arc::new(state),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Select a port, build the server and start serving in the background.
    ///
    /// Only valid from `Uninitialized`. A failed start is logged, moves the
    /// coordinator to `Stopped` and is returned to the caller, which should
    /// abort launch instead of presenting a window without a backend.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`] - already started (no listener is created)
    /// - [`HostError::Config`] - invalid configuration or unresolvable bundle path
    /// - [`HostError::Port`] - no ephemeral port could be allocated
    /// - [`HostError::Startup`] - missing bundle, lost bind race, bad dev server URL
    pub async fn start(&self) -> Result<ServerDescriptor, HostError> {
        self.transition("start", LifecycleState::Uninitialized, LifecycleState::Starting)?;

        match self.launch().await {
            Ok(descriptor) => {
                self.state.send_replace(LifecycleState::Running);
                info!(
                    "Backend {} running at {} (frontend: {})",
                    descriptor.instance_id(),
                    descriptor.backend_uri(),
                    descriptor.frontend_uri()
                );
                Ok(descriptor)
            }
            Err(e) => {
                error!("FATAL: Backend startup failed: {e}");
                self.state.send_replace(LifecycleState::Stopped);
                Err(e)
            }
        }
    }

    async fn launch(&self) -> Result<ServerDescriptor, HostError> {
        self.config.validate()?;

        info!("Starting embedded backend in {} mode", self.config.mode);

        let dev_frontend_uri = match self.config.mode {
            ServeMode::Packaged => None,
            ServeMode::Development => Some(
                Url::parse(&self.config.dev_frontend_url).map_err(StartupError::from)?,
            ),
        };

        let port = ports::select_endpoint(self.config.preferred_port)?;

        let metadata = MetadataRecordBuilder::default()
            .with_environment(self.config.environment_name())
            .build()?;

        let router = server::build_router(&self.config, metadata)?;
        let handle = server::start_server(router, port).await?;

        let backend_uri = Url::parse(&format!(
            "{BACKEND_BASE_URL}:{}/",
            handle.local_addr().port()
        ))
        .map_err(StartupError::from)?;
        let frontend_uri = dev_frontend_uri.unwrap_or_else(|| backend_uri.clone());

        Ok(ServerDescriptor::new(handle, backend_uri, frontend_uri))
    }

    /// Gracefully stop the backend described by `descriptor` and release it.
    ///
    /// Waits up to the configured grace period for in-flight requests, then
    /// force-closes what is left. The coordinator ends in `Stopped` whether or
    /// not shutdown was clean; failures are logged and returned so the caller
    /// can report them, but they never leave the listener running.
    pub async fn stop(&self, descriptor: ServerDescriptor) -> Result<(), HostError> {
        self.transition("stop", LifecycleState::Running, LifecycleState::Stopping)?;

        let instance_id = descriptor.instance_id();
        info!(
            "Stopping backend {instance_id} at {}",
            descriptor.backend_uri()
        );

        let result = descriptor
            .into_handle()
            .shutdown(self.config.shutdown_grace())
            .await;

        self.state.send_replace(LifecycleState::Stopped);

        match result {
            Ok(()) => {
                info!("Backend {instance_id} stopped");
                Ok(())
            }
            Err(e) => {
                error!("Backend {instance_id} shutdown failed: {e}");
                Err(e.into())
            }
        }
    }

    #[track_caller]
    fn transition(
        &self,
        operation: &'static str,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<(), LifecycleError> {
        let mut observed = from;
        let changed = self.state.send_if_modified(|state| {
            observed = *state;
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        });

        if changed {
            debug!("Lifecycle {from:?} -> {to:?}");
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                operation,
                state: observed,
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }
}
