//! Test helpers for backend integration tests.
//!
//! - Building a throwaway frontend bundle on disk
//! - Configs that never collide on the default port
//! - Plain HTTP helpers against the running backend

use host_core::config::{HostConfig, ServeMode};
use host_core::ports::allocate_ephemeral;

use std::fs::{create_dir_all, write};

use reqwest::{Client, Response};
use tempfile::TempDir;
use url::Url;

pub const INDEX_HTML: &str = "<!doctype html><html><body><app-root></app-root></body></html>";
pub const APP_JS: &str = "console.log('desktopapp');";
pub const DOCS_INDEX_HTML: &str = "<!doctype html><html><body>docs</body></html>";

/// Test helper: Write a minimal bundle (`index.html`, `main.js`, `docs/index.html`).
pub fn create_bundle() -> TempDir {
    let dir = TempDir::new().expect("Failed to create bundle dir");
    write(dir.path().join("index.html"), INDEX_HTML).expect("Failed to write index.html");
    write(dir.path().join("main.js"), APP_JS).expect("Failed to write main.js");
    create_dir_all(dir.path().join("docs")).expect("Failed to create docs dir");
    write(dir.path().join("docs").join("index.html"), DOCS_INDEX_HTML)
        .expect("Failed to write docs/index.html");
    dir
}

/// Test helper: Packaged-mode config serving `bundle` on a free port.
pub fn packaged_config(bundle: &TempDir) -> HostConfig {
    HostConfig {
        preferred_port: allocate_ephemeral().expect("Failed to allocate port"),
        frontend_dir: Some(bundle.path().to_path_buf()),
        ..HostConfig::default()
    }
}

/// Test helper: Development-mode config on a free port.
pub fn development_config() -> HostConfig {
    HostConfig {
        mode: ServeMode::Development,
        preferred_port: allocate_ephemeral().expect("Failed to allocate port"),
        ..HostConfig::default()
    }
}

/// Test helper: GET `path` relative to `base` with a fresh client.
pub async fn get(base: &Url, path: &str) -> Response {
    let url = base.join(path).expect("Failed to build URL");
    Client::new()
        .get(url)
        .send()
        .await
        .expect("Request to backend failed")
}
