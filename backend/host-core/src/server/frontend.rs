//! Static serving of the prebuilt frontend bundle.

use crate::error::startup::StartupError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;

use log::{debug, warn};
use tower_http::services::{ServeDir, ServeFile};

pub const INDEX_DOCUMENT: &str = "index.html";

/// Build the service answering every non-API request in packaged mode.
///
/// Existing files are served as-is, directories resolve to their
/// `index.html`, and anything else gets the root `index.html` with a 200 so
/// the frontend router can handle the path.
#[track_caller]
pub fn serve_bundle(frontend_dir: &Path) -> Result<ServeDir<ServeFile>, StartupError> {
    if !frontend_dir.is_dir() {
        return Err(StartupError::FrontendMissing {
            message: format!(
                "Frontend bundle directory not found: {}",
                frontend_dir.display()
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let index = frontend_dir.join(INDEX_DOCUMENT);
    if !index.is_file() {
        warn!(
            "{INDEX_DOCUMENT} missing from {}; unmatched routes will return 404",
            frontend_dir.display()
        );
    }

    debug!("Serving frontend bundle from {}", frontend_dir.display());

    Ok(ServeDir::new(frontend_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(index)))
}
