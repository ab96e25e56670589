pub mod config;
pub mod lifecycle;
pub mod port;
pub mod shutdown;
pub mod startup;

use models::ModelError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Port(#[from] port::PortError),

    #[error(transparent)]
    Startup(#[from] startup::StartupError),

    #[error(transparent)]
    Shutdown(#[from] shutdown::ShutdownError),

    #[error(transparent)]
    Lifecycle(#[from] lifecycle::LifecycleError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
