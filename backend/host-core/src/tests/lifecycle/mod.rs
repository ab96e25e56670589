// Unit tests for the lifecycle state machine

use crate::config::{HostConfig, ServeMode};
use crate::error::HostError;
use crate::error::lifecycle::LifecycleError;
use crate::error::startup::StartupError;
use crate::lifecycle::{HostCoordinator, LifecycleState};
use crate::ports::allocate_ephemeral;

use tempfile::tempdir;

fn development_config() -> HostConfig {
    HostConfig {
        mode: ServeMode::Development,
        preferred_port: allocate_ephemeral().expect("ephemeral port"),
        ..HostConfig::default()
    }
}

#[test]
fn given_new_coordinator_when_inspected_then_is_uninitialized() {
    let coordinator = HostCoordinator::new(HostConfig::default());

    assert_eq!(coordinator.state(), LifecycleState::Uninitialized);
}

/// **VALUE**: Verifies the full happy-path walk through the state machine.
#[tokio::test]
async fn given_coordinator_when_started_and_stopped_then_walks_every_state() {
    // GIVEN: A coordinator and an observer
    let coordinator = HostCoordinator::new(development_config());
    let observer = coordinator.subscribe();

    // WHEN: Starting
    let descriptor = coordinator.start().await.expect("start");

    // THEN: Running
    assert_eq!(coordinator.state(), LifecycleState::Running);
    assert_eq!(*observer.borrow(), LifecycleState::Running);
    assert!(descriptor.is_serving());

    // WHEN: Stopping
    coordinator.stop(descriptor).await.expect("stop");

    // THEN: Stopped
    assert_eq!(coordinator.state(), LifecycleState::Stopped);
}

/// **VALUE**: Verifies that a second start is rejected without a new listener.
///
/// **WHY THIS MATTERS**: Two listeners would leave one of them orphaned at
/// shutdown, keeping a port open after the window closes.
#[tokio::test]
async fn given_running_coordinator_when_started_again_then_rejects_transition() {
    // GIVEN: A running coordinator
    let coordinator = HostCoordinator::new(development_config());
    let descriptor = coordinator.start().await.expect("first start");

    // WHEN: Starting again
    let second = coordinator.start().await;

    // THEN: Rejected, state unchanged
    match second {
        Err(HostError::Lifecycle(LifecycleError::InvalidTransition { state, .. })) => {
            assert_eq!(state, LifecycleState::Running);
        }
        Err(other) => panic!("expected InvalidTransition, got {other}"),
        Ok(_) => panic!("second start must not create another server"),
    }
    assert_eq!(coordinator.state(), LifecycleState::Running);

    coordinator.stop(descriptor).await.expect("stop");
}

/// **VALUE**: Verifies that a failed start is terminal.
///
/// **BUG THIS CATCHES**: Would catch the coordinator staying in `Starting`
/// (blocking forever) or silently going back to `Uninitialized`.
#[tokio::test]
async fn given_missing_bundle_when_starting_then_fails_and_ends_stopped() {
    // GIVEN: Packaged mode with no bundle on disk
    let dir = tempdir().expect("temp dir");
    let coordinator = HostCoordinator::new(HostConfig {
        preferred_port: allocate_ephemeral().expect("ephemeral port"),
        frontend_dir: Some(dir.path().join("missing")),
        ..HostConfig::default()
    });

    // WHEN: Starting
    let result = coordinator.start().await;

    // THEN: Startup error, terminal state, and no restart possible
    assert!(matches!(
        result,
        Err(HostError::Startup(StartupError::FrontendMissing { .. }))
    ));
    assert_eq!(coordinator.state(), LifecycleState::Stopped);
    assert!(matches!(
        coordinator.start().await,
        Err(HostError::Lifecycle(LifecycleError::InvalidTransition { .. }))
    ));
}

/// **VALUE**: Verifies that an invalid config fails before any port is probed.
#[tokio::test]
async fn given_invalid_config_when_starting_then_returns_config_error() {
    let coordinator = HostCoordinator::new(HostConfig {
        shutdown_grace_secs: 0,
        ..development_config()
    });

    let result = coordinator.start().await;

    assert!(matches!(result, Err(HostError::Config(_))));
    assert_eq!(coordinator.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn given_uninitialized_coordinator_when_stopping_foreign_descriptor_then_rejects() {
    // GIVEN: One running coordinator and one that never started
    let running = HostCoordinator::new(development_config());
    let idle = HostCoordinator::new(development_config());
    let descriptor = running.start().await.expect("start");

    // WHEN: The idle coordinator is asked to stop it
    let result = idle.stop(descriptor).await;

    // THEN: Rejected based on the idle coordinator's state
    assert!(matches!(
        result,
        Err(HostError::Lifecycle(LifecycleError::InvalidTransition {
            state: LifecycleState::Uninitialized,
            ..
        }))
    ));
}
