use crate::error::config::ConfigError;
use crate::{DEFAULT_PORT, DEV_FRONTEND_URL};

use common::ErrorLocation;

use std::env::current_exe;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

/// Bundle location relative to the executable when no override is configured.
const BUNDLED_FRONTEND_DIR: [&str; 3] = ["wwwroot", "dist", "browser"];

const MAX_SHUTDOWN_GRACE_SECS: u64 = 60;

pub const ENV_MODE: &str = "DESKTOPAPP_MODE";
pub const ENV_ENVIRONMENT: &str = "DESKTOPAPP_ENVIRONMENT";
pub const ENV_PORT: &str = "DESKTOPAPP_PORT";
pub const ENV_FRONTEND_DIR: &str = "DESKTOPAPP_FRONTEND_DIR";

pub const PRODUCTION_ENVIRONMENT: &str = "Production";
pub const DEVELOPMENT_ENVIRONMENT: &str = "Development";

// ============================================
// SERVE MODE
// ============================================

/// Where the frontend comes from.
///
/// `Packaged` serves the bundle from this process; `Development` leaves the
/// frontend to an external dev server and only exposes the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    Packaged,
    Development,
}

impl Default for ServeMode {
    fn default() -> Self {
        ServeMode::Packaged
    }
}

impl ServeMode {
    /// Configuration name reported when no explicit environment is set.
    pub fn default_environment(&self) -> &'static str {
        match self {
            ServeMode::Packaged => PRODUCTION_ENVIRONMENT,
            ServeMode::Development => DEVELOPMENT_ENVIRONMENT,
        }
    }
}

impl FromStr for ServeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "packaged" => Ok(ServeMode::Packaged),
            "development" => Ok(ServeMode::Development),
            other => Err(format!(
                "unknown serve mode '{other}' (expected 'packaged' or 'development')"
            )),
        }
    }
}

impl Display for ServeMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            ServeMode::Packaged => write!(formatter, "packaged"),
            ServeMode::Development => write!(formatter, "development"),
        }
    }
}

// ============================================
// CONFIG STRUCT
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_preferred_port")]
    pub preferred_port: u16,

    #[serde(default)]
    pub mode: ServeMode,

    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub frontend_dir: Option<PathBuf>,

    #[serde(default = "default_dev_frontend_url")]
    pub dev_frontend_url: String,

    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferred_port: default_preferred_port(),
            mode: ServeMode::default(),
            environment: None,
            frontend_dir: None,
            dev_frontend_url: default_dev_frontend_url(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_preferred_port() -> u16 {
    DEFAULT_PORT
}
fn default_dev_frontend_url() -> String {
    DEV_FRONTEND_URL.to_string()
}
fn default_shutdown_grace_secs() -> u64 {
    5
}

// ============================================
// IMPLEMENTATION
// ============================================

impl HostConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(HostConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: HostConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using temp file + rename.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.preferred_port == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("preferred_port must be non-zero"),
            });
        }

        if let Some(ref environment) = self.environment
            && environment.trim().is_empty()
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("environment cannot be empty string"),
            });
        }

        if !self.dev_frontend_url.starts_with("http://")
            && !self.dev_frontend_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid URL format: {}", self.dev_frontend_url),
            });
        }

        if self.shutdown_grace_secs == 0 || self.shutdown_grace_secs > MAX_SHUTDOWN_GRACE_SECS {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid shutdown grace: {}s (must be 1-{MAX_SHUTDOWN_GRACE_SECS})",
                    self.shutdown_grace_secs
                ),
            });
        }

        Ok(())
    }

    /// Apply `DESKTOPAPP_*` environment variables on top of the loaded values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unset keys leave the current value untouched; malformed values fail.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_MODE) {
            self.mode = mode.parse().map_err(|reason| ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("{ENV_MODE}: {reason}"),
            })?;
            debug!("{ENV_MODE} override: {}", self.mode);
        }

        if let Some(environment) = lookup(ENV_ENVIRONMENT) {
            debug!("{ENV_ENVIRONMENT} override: {environment}");
            self.environment = Some(environment);
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.preferred_port =
                port.trim()
                    .parse()
                    .map_err(|e| ConfigError::ValidationError {
                        location: ErrorLocation::from(Location::caller()),
                        reason: format!("{ENV_PORT}: invalid port '{port}': {e}"),
                    })?;
            debug!("{ENV_PORT} override: {}", self.preferred_port);
        }

        if let Some(frontend_dir) = lookup(ENV_FRONTEND_DIR) {
            debug!("{ENV_FRONTEND_DIR} override: {frontend_dir}");
            self.frontend_dir = Some(PathBuf::from(frontend_dir));
        }

        self.validate()
    }

    /// Configuration name reported by the metadata endpoint.
    pub fn environment_name(&self) -> String {
        self.environment
            .clone()
            .unwrap_or_else(|| self.mode.default_environment().to_string())
    }

    /// Directory holding the prebuilt frontend bundle.
    pub fn resolve_frontend_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref dir) = self.frontend_dir {
            return Ok(dir.clone());
        }

        let exe = current_exe().map_err(|e| ConfigError::ResolveError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Failed to get current executable path: {e}"),
        })?;

        let exe_dir = exe.parent().ok_or_else(|| ConfigError::ResolveError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Executable has no parent directory: {}", exe.display()),
        })?;

        Ok(BUNDLED_FRONTEND_DIR
            .iter()
            .fold(exe_dir.to_path_buf(), |dir, part| dir.join(part)))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
