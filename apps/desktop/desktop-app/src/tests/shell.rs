use crate::shell::{APP_DIR_NAME, default_config_dir, default_log_dir, load_config};

use host_core::config::{ENV_MODE, ENV_PORT, HostConfig, ServeMode};

use std::fs::write;

use serial_test::serial;
use tempfile::TempDir;

/// **VALUE**: Verifies the per-user directory layout.
#[test]
fn given_platform_dirs_when_resolving_defaults_then_use_app_dir_name() {
    // dirs returns None only without a home directory; nothing to check then.
    if let Ok(log_dir) = default_log_dir() {
        assert!(log_dir.ends_with(format!("{APP_DIR_NAME}/logs")));
    }
    if let Ok(config_dir) = default_config_dir() {
        assert!(config_dir.ends_with(APP_DIR_NAME));
    }
}

/// **VALUE**: Verifies that environment overrides win over the config file.
///
/// **WHY THIS MATTERS**: Switching to development mode is done through
/// `DESKTOPAPP_MODE` (or `.env`), without editing the user's config file.
#[test]
#[serial]
fn given_config_file_and_env_overrides_when_loading_then_env_wins() {
    // GIVEN: A config file in packaged mode and env overrides
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write(
        temp_dir.path().join("config.json"),
        r#"{ "version": 1, "preferred_port": 60001, "mode": "packaged" }"#,
    )
    .expect("Failed to write config");

    // SAFETY: serialized with every other env-mutating test
    unsafe {
        std::env::set_var(ENV_MODE, "Development");
        std::env::set_var(ENV_PORT, "60002");
    }

    // WHEN: Loading
    let result = load_config(temp_dir.path());

    // SAFETY: as above
    unsafe {
        std::env::remove_var(ENV_MODE);
        std::env::remove_var(ENV_PORT);
    }

    // THEN: Overrides applied on top of the file
    let config = result.expect("Config should load");
    assert_eq!(config.mode, ServeMode::Development);
    assert_eq!(config.preferred_port, 60002);
    assert_eq!(config.environment_name(), "Development");
}

/// **VALUE**: Verifies a missing config file yields defaults.
#[test]
#[serial]
fn given_empty_config_dir_when_loading_then_returns_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let config = load_config(temp_dir.path()).expect("Config should load");

    assert_eq!(config, HostConfig::default());
}

/// **VALUE**: Verifies a corrupted config file is reported, not ignored.
#[test]
#[serial]
fn given_corrupted_config_file_when_loading_then_returns_core_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write(temp_dir.path().join("config.json"), "{ not json").expect("write");

    let result = load_config(temp_dir.path());

    assert!(matches!(result, Err(crate::error::ShellError::Core { .. })));
}
