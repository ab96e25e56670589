//! HTTP server bootstrap.
//!
//! Builds the axum router for the configured [`ServeMode`] and starts it on a
//! background task bound to the loopback interface.
//!
//! # Routing order
//!
//! 1. `GET /api/metadata`
//! 2. any other `/api` or `/api/*` path answers 404 and never reaches static files
//! 3. files from the frontend bundle (packaged mode only)
//! 4. `index.html` for everything else (packaged mode only)
//!
//! In development mode steps 3 and 4 are replaced by the same JSON 404 as step 2.
//!
//! # Security
//!
//! CORS is fully permissive. The listener binds `127.0.0.1` only and serves
//! the co-located desktop shell, so there is no public surface to protect.

pub mod frontend;
pub mod handle;
mod listener;
mod request_log;

pub use handle::ServerHandle;

use listener::AbortableListener;

use crate::config::{HostConfig, ServeMode};
use crate::error::HostError;
use crate::error::startup::StartupError;
use crate::metadata::metadata_handler;
use crate::{API_PREFIX, METADATA_ROUTE};

use common::ErrorLocation;
use models::MetadataRecord;

use std::net::{Ipv4Addr, SocketAddr};
use std::panic::Location;
use std::sync::Arc;

use axum::http::{StatusCode, Uri};
use axum::routing::{any, get};
use axum::{Json, Router, middleware};
use log::{error, info};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::spawn as TokioSpawn;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

/// Build the router for `config.mode`.
///
/// # Errors
///
/// - [`StartupError::FrontendMissing`] - packaged mode and the bundle directory does not exist
/// - [`crate::error::config::ConfigError::ResolveError`] - the default bundle location cannot be derived
pub fn build_router(config: &HostConfig, metadata: MetadataRecord) -> Result<Router, HostError> {
    let api = Router::new()
        .route(METADATA_ROUTE, get(metadata_handler))
        .route(API_PREFIX, any(not_found))
        .route(&format!("{API_PREFIX}/"), any(not_found))
        .route(&format!("{API_PREFIX}/{{*rest}}"), any(not_found))
        .with_state(Arc::new(metadata));

    let router = match config.mode {
        ServeMode::Packaged => {
            let frontend_dir = config.resolve_frontend_dir()?;
            api.fallback_service(frontend::serve_bundle(&frontend_dir)?)
        }
        ServeMode::Development => api.fallback(not_found),
    };

    Ok(router
        .layer(middleware::from_fn(request_log::log_request))
        .layer(CorsLayer::permissive()))
}

/// Bind `127.0.0.1:<port>` and serve `router` on a background task.
///
/// Returns once the listener is bound; the accept loop keeps running on the
/// runtime until the returned handle is shut down or dropped.
///
/// # Errors
///
/// Returns [`StartupError::Bind`] if the port was claimed after it was
/// probed, or cannot be bound for any other reason.
pub async fn start_server(router: Router, port: u16) -> Result<ServerHandle, StartupError> {
    let address = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| StartupError::Bind {
            message: format!("Failed to bind {address}: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;
    let local_addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let abort = CancellationToken::new();
    let listener = AbortableListener::new(listener, abort.clone());

    let task = TokioSpawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("Backend on {local_addr} received shutdown signal");
            })
            .await;

        if let Err(ref e) = result {
            error!("Backend on {local_addr} stopped with error: {e}");
        }
        result
    });

    info!("Backend listening on http://{local_addr}");

    Ok(ServerHandle::new(local_addr, shutdown_tx, abort, task))
}

/// Unknown API paths, and every non-API path in development mode.
async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found", "path": uri.path() })),
    )
}
