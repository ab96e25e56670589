use crate::helpers::development_config;

use host_core::lifecycle::HostCoordinator;
use host_core::lifecycle::readiness::wait_until_ready;
use host_core::ports::allocate_ephemeral;

use std::time::Duration;

use url::Url;

/// **VALUE**: Verifies the readiness probe returns the served record.
#[tokio::test]
async fn given_running_backend_when_waiting_until_ready_then_returns_metadata() {
    // GIVEN: A running backend
    let coordinator = HostCoordinator::new(development_config());
    let descriptor = coordinator.start().await.expect("Failed to start backend");

    // WHEN: Probing readiness
    let record = wait_until_ready(descriptor.backend_uri(), Duration::from_secs(5))
        .await
        .expect("Backend should be ready");

    // THEN: The record comes from the backend
    assert_eq!(record.environment, "Development");

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies the probe gives up when nothing listens.
///
/// **BUG THIS CATCHES**: Would catch an unbounded retry loop that hangs the
/// caller forever.
#[tokio::test]
async fn given_no_backend_when_waiting_until_ready_then_times_out() {
    // GIVEN: A port nobody listens on
    let port = allocate_ephemeral().expect("Failed to allocate port");
    let uri = Url::parse(&format!("http://127.0.0.1:{port}/")).expect("URL");

    // WHEN: Probing with a short deadline
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        wait_until_ready(&uri, Duration::from_millis(500)),
    )
    .await
    .expect("probe must respect its own deadline");

    // THEN: NotReady
    assert!(matches!(
        result,
        Err(host_core::error::startup::StartupError::NotReady { .. })
    ));
}
