//! Domain models for DesktopApp.
//!
//! Pure data structures exchanged between the embedded backend and the
//! frontend. Models carry validation but no I/O; `host-core` owns the
//! behavior that produces and serves them.

pub mod error;
pub mod metadata;

pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use metadata::builder::MetadataRecordBuilder;
pub use metadata::{APP_NAME, APP_VERSION, MetadataRecord};

#[cfg(test)]
mod tests;
