use crate::{APP_NAME, APP_VERSION, MetadataRecordBuilder, ModelError};

/// **VALUE**: Verifies that only the environment must be supplied.
///
/// **WHY THIS MATTERS**: Name and version are build-time constants. Callers
/// that forget to set them must still produce the real identity, otherwise
/// the frontend shows an empty title bar.
#[test]
fn given_only_environment_when_building_then_uses_build_identity() {
    // GIVEN: Builder with environment only
    let builder = MetadataRecordBuilder::default().with_environment("Production");

    // WHEN: Building
    let record = builder.build().expect("record should build");

    // THEN: Name and version come from the build constants
    assert_eq!(record.name, APP_NAME);
    assert_eq!(record.version, APP_VERSION);
    assert_eq!(record.environment, "Production");
}

/// **VALUE**: Verifies that a missing environment is rejected.
///
/// **BUG THIS CATCHES**: Would catch if the environment silently defaulted,
/// hiding a misconfigured runtime mode from the frontend.
#[test]
fn given_missing_environment_when_building_then_returns_validation_error() {
    // GIVEN: Builder without environment
    let builder = MetadataRecordBuilder::default().with_name("DesktopApp");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Environment is required");
        }
        Ok(record) => panic!("expected validation error, got {record:?}"),
    }
}

/// **VALUE**: Verifies that whitespace-only values are rejected.
#[test]
fn given_blank_values_when_building_then_returns_validation_error() {
    let blank_name = MetadataRecordBuilder::default()
        .with_name("  ")
        .with_environment("Production")
        .build();
    let blank_version = MetadataRecordBuilder::default()
        .with_version("")
        .with_environment("Production")
        .build();
    let blank_environment = MetadataRecordBuilder::default()
        .with_environment(" ")
        .build();

    assert!(matches!(blank_name, Err(ModelError::Validation { ref message, .. }) if message == "Application name cannot be empty"));
    assert!(matches!(blank_version, Err(ModelError::Validation { ref message, .. }) if message == "Application version cannot be empty"));
    assert!(matches!(blank_environment, Err(ModelError::Validation { ref message, .. }) if message == "Environment cannot be empty"));
}
