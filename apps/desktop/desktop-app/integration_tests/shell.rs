use desktop_app::error::ShellError;
use desktop_app::shell::run;
use desktop_app::surface::{DisplaySurface, ShutdownHook};

use host_core::DEV_FRONTEND_URL;
use host_core::config::{HostConfig, ServeMode};
use host_core::ports::allocate_ephemeral;

use common::ErrorLocation;
use models::{APP_NAME, APP_VERSION, MetadataRecord};

use std::fs::write;
use std::net::{Ipv4Addr, TcpStream};
use std::panic::Location;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use tempfile::TempDir;
use url::Url;

// ============================================================================
// Integration tests for the shell run loop
// A recording surface stands in for the window: it talks to the backend
// while "open", then closes like a user would.
// ============================================================================

#[derive(Debug, Default)]
struct Observed {
    presented: bool,
    frontend_uri: Option<Url>,
    backend_uri: Option<Url>,
    metadata: Option<MetadataRecord>,
}

struct RecordingSurface {
    observed: Arc<Mutex<Observed>>,
}

impl DisplaySurface for RecordingSurface {
    fn present(
        self: Box<Self>,
        frontend_uri: &Url,
        on_close: ShutdownHook,
    ) -> Result<(), ShellError> {
        let backend_uri = on_close.backend_uri().clone();
        let metadata_url = backend_uri.join("/api/metadata").expect("metadata URL");

        let metadata = on_close.runtime().block_on(async move {
            let response = reqwest::get(metadata_url).await.expect("metadata request");
            assert_eq!(response.status(), StatusCode::OK);
            response.json::<MetadataRecord>().await.expect("metadata JSON")
        });

        {
            let mut observed = self.observed.lock().expect("lock");
            observed.presented = true;
            observed.frontend_uri = Some(frontend_uri.clone());
            observed.backend_uri = Some(backend_uri);
            observed.metadata = Some(metadata);
        }

        on_close.run()
    }
}

/// Fails as soon as it is presented, without running the hook.
struct FailingSurface {
    backend_uri: Arc<Mutex<Option<Url>>>,
}

impl DisplaySurface for FailingSurface {
    fn present(
        self: Box<Self>,
        _frontend_uri: &Url,
        on_close: ShutdownHook,
    ) -> Result<(), ShellError> {
        *self.backend_uri.lock().expect("lock") = Some(on_close.backend_uri().clone());
        assert!(!is_refused(on_close.backend_uri()), "backend should be up");

        Err(ShellError::Surface {
            message: String::from("window could not be created"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

fn recording_surface() -> (Box<RecordingSurface>, Arc<Mutex<Observed>>) {
    let observed = Arc::new(Mutex::new(Observed::default()));
    let surface = Box::new(RecordingSurface {
        observed: Arc::clone(&observed),
    });
    (surface, observed)
}

fn bundle() -> TempDir {
    let dir = TempDir::new().expect("Failed to create bundle dir");
    write(dir.path().join("index.html"), "<html></html>").expect("Failed to write index.html");
    dir
}

fn is_refused(uri: &Url) -> bool {
    let port = uri.port().expect("backend URI has a port");
    TcpStream::connect((Ipv4Addr::LOCALHOST, port)).is_err()
}

/// **VALUE**: Tests the whole launch: start, present, close, stop.
///
/// **WHY THIS MATTERS**: This is the closest we can get to an end-to-end test
/// without a real window. The surface only sees what a webview would see.
///
/// **BUG THIS CATCHES**: Would catch the backend outliving the surface, or the
/// surface being handed a URI that doesn't serve the frontend.
#[test]
fn given_packaged_config_when_surface_closes_then_backend_is_stopped() {
    // GIVEN: A packaged config and a recording surface
    let bundle = bundle();
    let config = HostConfig {
        preferred_port: allocate_ephemeral().expect("Failed to allocate port"),
        frontend_dir: Some(bundle.path().to_path_buf()),
        ..HostConfig::default()
    };
    let (surface, observed) = recording_surface();

    // WHEN: Running the shell until the surface closes
    let result = run(config, surface);

    // THEN: Clean exit
    assert!(result.is_ok(), "shell run failed: {result:?}");

    // AND: The surface saw the backend serving both frontend and API
    let observed = observed.lock().expect("lock");
    assert!(observed.presented);
    let backend_uri = observed.backend_uri.clone().expect("backend URI");
    assert_eq!(observed.frontend_uri.as_ref(), Some(&backend_uri));
    let metadata = observed.metadata.as_ref().expect("metadata");
    assert_eq!(metadata.name, APP_NAME);
    assert_eq!(metadata.version, APP_VERSION);
    assert_eq!(metadata.environment, "Production");

    // AND: Nothing listens any more
    assert!(is_refused(&backend_uri));
}

/// **VALUE**: Verifies development mode hands the dev server to the surface.
#[test]
fn given_development_config_when_running_then_surface_loads_dev_server() {
    // GIVEN: A development config without any bundle
    let config = HostConfig {
        mode: ServeMode::Development,
        preferred_port: allocate_ephemeral().expect("Failed to allocate port"),
        ..HostConfig::default()
    };
    let (surface, observed) = recording_surface();

    // WHEN: Running the shell
    let result = run(config, surface);

    // THEN: Window points at the dev server, API still served locally
    assert!(result.is_ok(), "shell run failed: {result:?}");
    let observed = observed.lock().expect("lock");
    assert_eq!(
        observed.frontend_uri.as_ref().map(Url::as_str),
        Some(DEV_FRONTEND_URL)
    );
    let metadata = observed.metadata.as_ref().expect("metadata");
    assert_eq!(metadata.environment, "Development");
}

/// **VALUE**: Verifies a fatal startup error aborts launch.
///
/// **WHY THIS MATTERS**: Showing a window without a backend leaves the user
/// staring at a blank page with no explanation.
#[test]
fn given_missing_bundle_when_running_then_fails_without_presenting() {
    // GIVEN: A packaged config pointing at a directory that does not exist
    let missing = TempDir::new().expect("temp dir").path().join("dist/browser");
    let config = HostConfig {
        preferred_port: allocate_ephemeral().expect("Failed to allocate port"),
        frontend_dir: Some(missing),
        ..HostConfig::default()
    };
    let (surface, observed) = recording_surface();

    // WHEN: Running the shell
    let result = run(config, surface);

    // THEN: Core error and the surface never opened
    assert!(matches!(result, Err(ShellError::Core { .. })));
    assert!(!observed.lock().expect("lock").presented);
}

/// **VALUE**: Verifies the backend is stopped even when the surface fails.
///
/// **WHY THIS MATTERS**: A window that fails to open must not leave the
/// listener behind without a stop being attempted and logged.
///
/// **BUG THIS CATCHES**: Would catch the shutdown hook being silently
/// dropped on the surface's error path.
#[test]
fn given_surface_failing_without_running_hook_when_running_then_backend_is_stopped() {
    // GIVEN: A development config and a surface that fails immediately
    let config = HostConfig {
        mode: ServeMode::Development,
        preferred_port: allocate_ephemeral().expect("Failed to allocate port"),
        ..HostConfig::default()
    };
    let backend_uri = Arc::new(Mutex::new(None));
    let surface = Box::new(FailingSurface {
        backend_uri: Arc::clone(&backend_uri),
    });

    // WHEN: Running the shell
    let result = run(config, surface);

    // THEN: The surface error is returned
    assert!(matches!(result, Err(ShellError::Surface { .. })));

    // AND: The backend no longer listens
    let backend_uri = backend_uri
        .lock()
        .expect("lock")
        .clone()
        .expect("surface was presented");
    assert!(is_refused(&backend_uri));
}
