//! `GET /api/metadata` handler.

use models::MetadataRecord;

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

/// Report the application identity and active environment.
///
/// The shared record is built once at startup; each request gets its own copy.
pub async fn metadata_handler(State(record): State<Arc<MetadataRecord>>) -> Json<MetadataRecord> {
    Json(MetadataRecord::clone(&record))
}
