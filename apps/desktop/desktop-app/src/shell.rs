//! Process-level wiring: directories, `.env`, configuration and the run loop.

use crate::error::ShellError;
use crate::surface::{DisplaySurface, ShutdownHook};

use common::ErrorLocation;
use host_core::config::HostConfig;
use host_core::error::HostError;
use host_core::lifecycle::HostCoordinator;
use host_core::lifecycle::readiness::wait_until_ready;

use std::env::current_exe;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use tokio::runtime::Builder as RuntimeBuilder;

/// Directory name used under the platform config and data directories.
pub const APP_DIR_NAME: &str = "DesktopApp";

const LOG_DIR_NAME: &str = "logs";
const ENV_FILE_NAME: &str = ".env";
const RUNTIME_THREAD_NAME: &str = "desktopapp-host";

/// How long the background readiness probe keeps trying.
const READINESS_WINDOW: Duration = Duration::from_secs(10);

/// Start the backend, present `surface`, and stop the backend once it closes.
///
/// Builds the tokio runtime the backend lives on. A failed start is returned
/// without presenting the surface.
///
/// # Errors
///
/// - [`ShellError::Shell`] - the runtime could not be built
/// - [`ShellError::Core`] - the backend failed to start or stop
/// - [`ShellError::Surface`] - the surface failed
pub fn run(config: HostConfig, surface: Box<dyn DisplaySurface>) -> Result<(), ShellError> {
    let runtime = RuntimeBuilder::new_multi_thread()
        .enable_all()
        .thread_name(RUNTIME_THREAD_NAME)
        .build()
        .map_err(|e| ShellError::Shell {
            message: format!("Failed to build async runtime: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let coordinator = HostCoordinator::new(config);
    let descriptor = runtime.block_on(coordinator.start())?;

    let backend_uri = descriptor.backend_uri().clone();
    runtime.spawn(async move {
        match wait_until_ready(&backend_uri, READINESS_WINDOW).await {
            Ok(record) => info!(
                "{} {} ({}) ready at {backend_uri}",
                record.name, record.version, record.environment
            ),
            Err(e) => warn!("Backend readiness probe failed: {e}"),
        }
    });

    let frontend_uri = descriptor.frontend_uri().clone();
    let on_close = ShutdownHook::new(coordinator, descriptor, runtime.handle().clone());

    surface.present(&frontend_uri, on_close)
}

/// Load `config.json` from `config_dir` and apply `DESKTOPAPP_*` overrides.
pub fn load_config(config_dir: &Path) -> Result<HostConfig, ShellError> {
    let mut config = HostConfig::load(config_dir).map_err(HostError::from)?;
    config.apply_env_overrides().map_err(HostError::from)?;
    Ok(config)
}

/// Load `.env` from the working directory, then from next to the executable.
///
/// Returns the path of the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    // Try current directory first
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded {ENV_FILE_NAME} from: {}", path.display());
        return Some(path);
    }

    // Try executable directory
    let exe_path = current_exe().ok()?;
    let env_path = exe_path.parent()?.join(ENV_FILE_NAME);
    if !env_path.exists() {
        return None;
    }

    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            info!("Loaded {ENV_FILE_NAME} from: {}", env_path.display());
            Some(env_path)
        }
        Err(e) => {
            warn!("Failed to parse {}: {e}", env_path.display());
            None
        }
    }
}

/// `<data_local_dir>/DesktopApp/logs`
pub fn default_log_dir() -> Result<PathBuf, ShellError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
        .ok_or_else(|| ShellError::Shell {
            message: String::from("Cannot determine local data directory"),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// `<config_dir>/DesktopApp`
pub fn default_config_dir() -> Result<PathBuf, ShellError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| ShellError::Shell {
            message: String::from("Cannot determine config directory"),
            location: ErrorLocation::from(Location::caller()),
        })
}
