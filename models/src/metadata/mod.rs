pub mod builder;

use serde::{Deserialize, Serialize};

/// Application name reported by the metadata endpoint.
pub const APP_NAME: &str = "DesktopApp";

/// Application version reported by the metadata endpoint.
pub const APP_VERSION: &str = "1.0.0";

/// Version and environment shown by the frontend when the backend is unreachable.
const PLACEHOLDER_VALUE: &str = "N/A";

/// Identity of the running application, served by `GET /api/metadata`.
///
/// Serialized with camelCase keys to match what the frontend reads:
/// `{ "name": ..., "version": ..., "environment": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub name: String,
    pub version: String,
    pub environment: String,
}

impl MetadataRecord {
    /// Record the frontend falls back to when the metadata request fails.
    pub fn placeholder() -> Self {
        Self {
            name: String::from(APP_NAME),
            version: String::from(PLACEHOLDER_VALUE),
            environment: String::from(PLACEHOLDER_VALUE),
        }
    }
}
