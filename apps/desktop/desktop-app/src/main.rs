// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use desktop_app::error::ShellError;
use desktop_app::logger::{LoggerGuard, initialize as LoggerInitialize};
use desktop_app::shell::{self, default_config_dir, default_log_dir, load_config, load_dotenv};
use desktop_app::surface::default_surface;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use log::{error, info};

fn main() -> ExitCode {
    // Initialize logger FIRST; the guard flushes it on every exit path
    let _logger = match initialize_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match launch() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

fn initialize_logging() -> Result<LoggerGuard, ShellError> {
    let log_dir = default_log_dir()?;

    create_dir_all(&log_dir).map_err(|e| ShellError::Shell {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let guard = LoggerInitialize(&log_dir)?;
    info!("Log directory: {}", log_dir.display());
    Ok(guard)
}

fn launch() -> Result<(), ShellError> {
    load_dotenv();

    let config_dir = default_config_dir()?;
    info!("Config directory: {}", config_dir.display());

    let config = load_config(&config_dir)?;
    shell::run(config, default_surface())
}
