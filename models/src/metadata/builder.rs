use crate::error::model_error::ModelError;
use crate::{APP_NAME, APP_VERSION, ErrorLocation, MetadataRecord};

use std::panic::Location;

/// Builder for validated [`MetadataRecord`] instances.
///
/// Name and version default to the build-time identity; only the
/// environment has to be supplied.
#[derive(Debug, Default)]
pub struct MetadataRecordBuilder {
    name: Option<String>,
    version: Option<String>,
    environment: Option<String>,
}

impl MetadataRecordBuilder {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Build the record with validation.
    #[track_caller]
    pub fn build(self) -> Result<MetadataRecord, ModelError> {
        let name = self.name.unwrap_or_else(|| String::from(APP_NAME));

        if name.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Application name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let version = self.version.unwrap_or_else(|| String::from(APP_VERSION));

        if version.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Application version cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let environment = self.environment.ok_or_else(|| ModelError::Validation {
            message: String::from("Environment is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if environment.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Environment cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(MetadataRecord {
            name,
            version,
            environment,
        })
    }
}
