// Unit tests for HostConfig loading, validation and overrides

use crate::DEFAULT_PORT;
use crate::config::{
    DEVELOPMENT_ENVIRONMENT, ENV_ENVIRONMENT, ENV_FRONTEND_DIR, ENV_MODE, ENV_PORT, HostConfig,
    PRODUCTION_ENVIRONMENT, ServeMode,
};
use crate::error::config::ConfigError;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serial_test::serial;
use tempfile::tempdir;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| values.get(key).cloned()
}

/// **VALUE**: Verifies that a first launch without a config file works.
///
/// **WHY THIS MATTERS**: A freshly installed app has no config directory yet.
/// Treating that as an error would abort the very first launch.
#[test]
fn given_missing_config_file_when_loading_then_returns_defaults() {
    // GIVEN: An empty config directory
    let dir = tempdir().expect("temp dir");

    // WHEN: Loading
    let config = HostConfig::load(dir.path()).expect("defaults should load");

    // THEN: Defaults are used
    assert_eq!(config, HostConfig::default());
    assert_eq!(config.preferred_port, DEFAULT_PORT);
    assert_eq!(config.mode, ServeMode::Packaged);
    assert_eq!(config.shutdown_grace(), Duration::from_secs(5));
}

/// **VALUE**: Verifies that saved settings are read back unchanged.
#[test]
fn given_saved_config_when_loading_then_values_survive() {
    // GIVEN: A customized config saved to disk
    let dir = tempdir().expect("temp dir");
    let config = HostConfig {
        preferred_port: 60123,
        mode: ServeMode::Development,
        environment: Some(String::from("Staging")),
        shutdown_grace_secs: 10,
        ..HostConfig::default()
    };
    config.save(dir.path()).expect("save should succeed");

    // WHEN: Loading it back
    let loaded = HostConfig::load(dir.path()).expect("load should succeed");

    // THEN: Every field matches and no temp file is left behind
    assert_eq!(loaded, config);
    assert!(!dir.path().join("config.json.tmp").exists());
}

/// **VALUE**: Verifies that partial files fill the gaps with defaults.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` that turns
/// a hand-edited one-line config into a parse error.
#[test]
fn given_partial_config_file_when_loading_then_missing_fields_use_defaults() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(dir.path().join("config.json"), r#"{ "mode": "development" }"#)
        .expect("write config");

    let config = HostConfig::load(dir.path()).expect("load should succeed");

    assert_eq!(config.mode, ServeMode::Development);
    assert_eq!(config.preferred_port, DEFAULT_PORT);
    assert_eq!(config.dev_frontend_url, "http://localhost:4200/");
}

#[test]
fn given_corrupted_config_file_when_loading_then_returns_parse_error() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(dir.path().join("config.json"), "{ not json").expect("write config");

    let result = HostConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies the validation bounds.
#[test]
fn given_out_of_range_values_when_validating_then_returns_validation_error() {
    let cases = [
        HostConfig {
            version: 0,
            ..HostConfig::default()
        },
        HostConfig {
            preferred_port: 0,
            ..HostConfig::default()
        },
        HostConfig {
            environment: Some(String::from("  ")),
            ..HostConfig::default()
        },
        HostConfig {
            dev_frontend_url: String::from("localhost:4200"),
            ..HostConfig::default()
        },
        HostConfig {
            shutdown_grace_secs: 0,
            ..HostConfig::default()
        },
        HostConfig {
            shutdown_grace_secs: 61,
            ..HostConfig::default()
        },
    ];

    for config in cases {
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "expected validation error for {config:?}"
        );
    }
}

/// **VALUE**: Verifies that every supported override is applied.
#[test]
fn given_override_values_when_applied_then_config_is_updated() {
    // GIVEN: Default config and a full set of overrides
    let mut config = HostConfig::default();
    let lookup = lookup_from(&[
        (ENV_MODE, "Development"),
        (ENV_ENVIRONMENT, "Staging"),
        (ENV_PORT, "60000"),
        (ENV_FRONTEND_DIR, "/opt/desktopapp/browser"),
    ]);

    // WHEN: Applying them
    config.apply_overrides_from(lookup).expect("overrides are valid");

    // THEN: Every field reflects the override
    assert_eq!(config.mode, ServeMode::Development);
    assert_eq!(config.environment_name(), "Staging");
    assert_eq!(config.preferred_port, 60000);
    assert_eq!(
        config.frontend_dir,
        Some(PathBuf::from("/opt/desktopapp/browser"))
    );
}

#[test]
fn given_malformed_overrides_when_applied_then_returns_validation_error() {
    let mut bad_mode = HostConfig::default();
    let mut bad_port = HostConfig::default();

    let mode_result = bad_mode.apply_overrides_from(lookup_from(&[(ENV_MODE, "release")]));
    let port_result = bad_port.apply_overrides_from(lookup_from(&[(ENV_PORT, "70000")]));

    assert!(matches!(mode_result, Err(ConfigError::ValidationError { .. })));
    assert!(matches!(port_result, Err(ConfigError::ValidationError { .. })));
}

/// **VALUE**: Verifies the reported environment follows the serve mode.
///
/// **WHY THIS MATTERS**: The frontend shows this value to tell users whether
/// they run a packaged build; it must not say "Production" in dev mode.
#[test]
fn given_no_explicit_environment_when_resolving_name_then_follows_mode() {
    let packaged = HostConfig::default();
    let development = HostConfig {
        mode: ServeMode::Development,
        ..HostConfig::default()
    };

    assert_eq!(packaged.environment_name(), PRODUCTION_ENVIRONMENT);
    assert_eq!(development.environment_name(), DEVELOPMENT_ENVIRONMENT);
}

#[test]
fn given_no_frontend_override_when_resolving_then_uses_bundle_next_to_executable() {
    let config = HostConfig::default();

    let dir = config.resolve_frontend_dir().expect("resolvable");

    assert!(dir.ends_with("wwwroot/dist/browser"));
}

/// **VALUE**: Verifies overrides are read from the real process environment.
///
/// Mutates process-wide state, so it runs serially.
#[test]
#[serial]
fn given_env_vars_when_applying_env_overrides_then_reads_process_environment() {
    // GIVEN: Mode and port set in the environment
    // SAFETY: serialized with every other test touching these variables
    unsafe {
        std::env::set_var(ENV_MODE, "development");
        std::env::set_var(ENV_PORT, "60001");
    }
    let mut config = HostConfig::default();

    // WHEN: Applying env overrides
    let result = config.apply_env_overrides();

    // Cleanup before asserting so a failure does not leak into other tests
    unsafe {
        std::env::remove_var(ENV_MODE);
        std::env::remove_var(ENV_PORT);
    }

    // THEN: Both values were picked up
    assert!(result.is_ok(), "overrides should apply: {result:?}");
    assert_eq!(config.mode, ServeMode::Development);
    assert_eq!(config.preferred_port, 60001);
}
