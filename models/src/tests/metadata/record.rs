use crate::{MetadataRecord, MetadataRecordBuilder};

/// **VALUE**: Verifies the exact JSON shape the frontend consumes.
///
/// **WHY THIS MATTERS**: The frontend reads `name`, `version` and
/// `environment` by key. A renamed field breaks the About panel without any
/// compile error on either side.
#[test]
fn given_production_record_when_serialized_then_matches_wire_format() {
    // GIVEN: The production record
    let record = MetadataRecordBuilder::default()
        .with_environment("Production")
        .build()
        .expect("record should build");

    // WHEN: Serializing to JSON
    let json = serde_json::to_value(&record).expect("record should serialize");

    // THEN: Keys and values match the API contract
    assert_eq!(
        json,
        serde_json::json!({
            "name": "DesktopApp",
            "version": "1.0.0",
            "environment": "Production"
        })
    );
}

#[test]
fn given_placeholder_when_built_then_keeps_name_and_marks_rest_unavailable() {
    let placeholder = MetadataRecord::placeholder();

    assert_eq!(placeholder.name, "DesktopApp");
    assert_eq!(placeholder.version, "N/A");
    assert_eq!(placeholder.environment, "N/A");
}
