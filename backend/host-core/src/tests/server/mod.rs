// Unit tests for router construction

use crate::config::{HostConfig, ServeMode};
use crate::error::HostError;
use crate::error::startup::StartupError;
use crate::server::build_router;
use crate::server::frontend::serve_bundle;

use models::{MetadataRecord, MetadataRecordBuilder};

use tempfile::tempdir;

fn record(environment: &str) -> MetadataRecord {
    MetadataRecordBuilder::default()
        .with_environment(environment)
        .build()
        .expect("metadata record")
}

/// **VALUE**: Verifies that packaged mode refuses a missing bundle directory.
///
/// **WHY THIS MATTERS**: Serving from a directory that does not exist would
/// open a window with a blank page. Startup must fail instead.
#[test]
fn given_missing_bundle_dir_when_building_packaged_router_then_returns_frontend_missing() {
    // GIVEN: Packaged mode pointing at a path that does not exist
    let dir = tempdir().expect("temp dir");
    let config = HostConfig {
        frontend_dir: Some(dir.path().join("does-not-exist")),
        ..HostConfig::default()
    };

    // WHEN: Building the router
    let result = build_router(&config, record("Production"));

    // THEN: Startup error names the missing bundle
    match result {
        Err(HostError::Startup(StartupError::FrontendMissing { message, .. })) => {
            assert!(message.contains("does-not-exist"));
        }
        Err(other) => panic!("expected FrontendMissing, got {other}"),
        Ok(_) => panic!("expected FrontendMissing, got a router"),
    }
}

/// **VALUE**: Verifies that development mode never touches the bundle path.
///
/// **BUG THIS CATCHES**: Would catch static serving being wired up
/// unconditionally, which fails dev launches where no bundle was built.
#[test]
fn given_development_mode_without_bundle_when_building_router_then_succeeds() {
    let dir = tempdir().expect("temp dir");
    let config = HostConfig {
        mode: ServeMode::Development,
        frontend_dir: Some(dir.path().join("does-not-exist")),
        ..HostConfig::default()
    };

    let result = build_router(&config, record("Development"));

    assert!(result.is_ok());
}

#[test]
fn given_bundle_without_index_when_serving_then_still_builds() {
    let dir = tempdir().expect("temp dir");

    let result = serve_bundle(dir.path());

    assert!(result.is_ok(), "missing index.html is only a warning");
}
