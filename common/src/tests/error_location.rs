use crate::ErrorLocation;

use std::panic::Location;

#[track_caller]
fn capture() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

/// **VALUE**: Verifies that the location points at the caller, not the helper.
///
/// **WHY THIS MATTERS**: Every error in the workspace embeds an `ErrorLocation`.
/// If `#[track_caller]` stops propagating, all logged errors point at the same
/// constructor line and become useless for diagnosing startup failures.
#[test]
fn given_track_caller_helper_when_capturing_then_reports_call_site() {
    // GIVEN: The line of the call below
    let expected_line = line!() + 3;

    // WHEN: Capturing through a #[track_caller] helper
    let location = capture();

    // THEN: The reported line is this test's call site
    assert_eq!(location.line, expected_line);
    assert!(location.file.ends_with("error_location.rs"));
}

/// **VALUE**: Verifies the bracketed `[file:line:column]` display format.
///
/// **BUG THIS CATCHES**: Would catch a format change that breaks log grepping.
#[test]
fn given_location_when_displayed_then_uses_bracketed_format() {
    // GIVEN: A fixed location
    let location = ErrorLocation {
        file: "src/ports/mod.rs",
        line: 42,
        column: 7,
    };

    // WHEN / THEN
    assert_eq!(location.to_string(), "[src/ports/mod.rs:42:7]");
}
