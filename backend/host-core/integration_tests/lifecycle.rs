use crate::helpers::{create_bundle, development_config, get, packaged_config};

use host_core::config::HostConfig;
use host_core::lifecycle::{HostCoordinator, LifecycleState};
use host_core::ports::is_available;
use host_core::{DEFAULT_PORT, DEV_FRONTEND_URL};

use std::net::{Ipv4Addr, TcpListener};

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// **VALUE**: Verifies the occupied-default-port scenario end to end.
///
/// **WHY THIS MATTERS**: A second instance of the app, or any other program
/// on 54321, must not stop the shell from launching.
///
/// The default port may already be taken on the test machine; either way
/// it is occupied while the coordinator starts.
#[tokio::test]
async fn given_default_port_occupied_when_starting_then_serves_metadata_on_another_port() {
    // GIVEN: The default port held by someone else
    let _blocker = TcpListener::bind((Ipv4Addr::LOCALHOST, DEFAULT_PORT)).ok();
    assert!(!is_available(DEFAULT_PORT));

    let bundle = create_bundle();
    let coordinator = HostCoordinator::new(HostConfig {
        preferred_port: DEFAULT_PORT,
        ..packaged_config(&bundle)
    });

    // WHEN: Starting the backend
    let descriptor = coordinator.start().await.expect("Failed to start backend");

    // THEN: It listens elsewhere and answers with the exact metadata document
    assert_ne!(descriptor.port(), DEFAULT_PORT);
    assert_eq!(descriptor.backend_uri(), descriptor.frontend_uri());

    let response = get(descriptor.backend_uri(), "/api/metadata").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(
        body,
        json!({ "name": "DesktopApp", "version": "1.0.0", "environment": "Production" })
    );

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies the preferred port is used when free.
#[tokio::test]
async fn given_free_preferred_port_when_starting_then_backend_uri_uses_it() {
    let bundle = create_bundle();
    let config = packaged_config(&bundle);
    let preferred = config.preferred_port;
    let coordinator = HostCoordinator::new(config);

    let descriptor = coordinator.start().await.expect("Failed to start backend");

    assert_eq!(descriptor.port(), preferred);
    assert_eq!(
        descriptor.backend_uri().as_str(),
        format!("http://127.0.0.1:{preferred}/")
    );

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies that shutdown releases the listener.
///
/// **BUG THIS CATCHES**: Would catch an orphaned listening socket after the
/// window closes, which also blocks the default port for the next launch.
#[tokio::test]
async fn given_running_backend_when_stopped_then_requests_are_refused() {
    // GIVEN: A running backend that answered once
    let bundle = create_bundle();
    let coordinator = HostCoordinator::new(packaged_config(&bundle));
    let descriptor = coordinator.start().await.expect("Failed to start backend");
    let backend_uri = descriptor.backend_uri().clone();
    let port = descriptor.port();
    assert_eq!(get(&backend_uri, "/api/metadata").await.status(), StatusCode::OK);

    // WHEN: Stopping
    coordinator.stop(descriptor).await.expect("Failed to stop backend");

    // THEN: The port is free and new requests are refused
    assert_eq!(coordinator.state(), LifecycleState::Stopped);
    assert!(is_available(port));

    let url = backend_uri.join("/api/metadata").expect("URL");
    let result = Client::new().get(url).send().await;
    match result {
        Err(e) => assert!(e.is_connect(), "expected connection refused, got {e}"),
        Ok(response) => panic!("backend still answering: {}", response.status()),
    }
}

/// **VALUE**: Verifies the frontend URI in development mode.
///
/// **WHY THIS MATTERS**: The window must load the dev server with hot reload,
/// while API calls still go to the embedded backend.
#[tokio::test]
async fn given_development_mode_when_starting_then_frontend_points_at_dev_server() {
    let coordinator = HostCoordinator::new(development_config());

    let descriptor = coordinator.start().await.expect("Failed to start backend");

    assert_eq!(descriptor.frontend_uri().as_str(), DEV_FRONTEND_URL);
    assert_ne!(descriptor.frontend_uri(), descriptor.backend_uri());

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies that a lost bind race surfaces as a startup failure.
///
/// **BUG THIS CATCHES**: Would catch the server silently sharing or
/// stealing a port claimed between probe and bind.
#[tokio::test]
async fn given_port_taken_after_probe_when_server_binds_then_start_server_fails() {
    // GIVEN: A port held by another listener
    let blocker = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind");
    let port = blocker.local_addr().expect("addr").port();

    // WHEN: Binding the server directly on it
    let result = host_core::server::start_server(axum::Router::new(), port).await;

    // THEN: Bind error
    assert!(matches!(
        result,
        Err(host_core::error::startup::StartupError::Bind { .. })
    ));
}
