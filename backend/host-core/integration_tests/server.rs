use crate::helpers::{
    APP_JS, DOCS_INDEX_HTML, INDEX_HTML, create_bundle, development_config, get, packaged_config,
};

use host_core::lifecycle::HostCoordinator;
use host_core::ports::allocate_ephemeral;
use host_core::server::start_server;

use models::{APP_NAME, APP_VERSION, MetadataRecord};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::Router;
use axum::routing::get as get_route;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use url::Url;

/// **VALUE**: Verifies the metadata endpoint contract in packaged mode.
///
/// **WHY THIS MATTERS**: The frontend's About panel is fed exclusively by
/// this endpoint. A wrong shape or status shows the placeholder record.
#[tokio::test]
async fn given_packaged_backend_when_requesting_metadata_then_returns_production_record() {
    // GIVEN: A running packaged backend
    let bundle = create_bundle();
    let coordinator = HostCoordinator::new(packaged_config(&bundle));
    let descriptor = coordinator.start().await.expect("Failed to start backend");

    // WHEN: Requesting metadata
    let response = get(descriptor.backend_uri(), "/api/metadata").await;

    // THEN: 200 with the production record
    assert_eq!(response.status(), StatusCode::OK);
    let record: MetadataRecord = response.json().await.expect("Invalid metadata JSON");
    assert_eq!(record.name, APP_NAME);
    assert_eq!(record.version, APP_VERSION);
    assert_eq!(record.environment, "Production");

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies name and version never change within one process.
#[tokio::test]
async fn given_running_backend_when_requesting_metadata_repeatedly_then_identity_is_stable() {
    let bundle = create_bundle();
    let coordinator = HostCoordinator::new(packaged_config(&bundle));
    let descriptor = coordinator.start().await.expect("Failed to start backend");

    let mut records = Vec::new();
    for _ in 0..3 {
        let response = get(descriptor.backend_uri(), "/api/metadata").await;
        records.push(response.json::<MetadataRecord>().await.expect("Invalid JSON"));
    }

    assert!(records.windows(2).all(|pair| pair[0] == pair[1]));

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies static files, default documents and the SPA fallback.
///
/// **WHY THIS MATTERS**: Client-side routes like `/settings/profile` only
/// exist in the frontend router. Answering them with 404 breaks deep links
/// and page reloads inside the desktop window.
#[tokio::test]
async fn given_packaged_backend_when_requesting_static_paths_then_serves_bundle_or_index() {
    // GIVEN: A running packaged backend
    let bundle = create_bundle();
    let coordinator = HostCoordinator::new(packaged_config(&bundle));
    let descriptor = coordinator.start().await.expect("Failed to start backend");
    let base = descriptor.backend_uri().clone();

    // WHEN / THEN: Root resolves to index.html
    let root = get(&base, "/").await;
    assert_eq!(root.status(), StatusCode::OK);
    assert_eq!(root.text().await.expect("body"), INDEX_HTML);

    // WHEN / THEN: Existing asset is served as-is
    let asset = get(&base, "/main.js").await;
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(asset.text().await.expect("body"), APP_JS);

    // WHEN / THEN: Directory resolves to its own index.html
    let docs = get(&base, "/docs/").await;
    assert_eq!(docs.status(), StatusCode::OK);
    assert_eq!(docs.text().await.expect("body"), DOCS_INDEX_HTML);

    // WHEN / THEN: Unknown paths fall back to the root index.html with 200
    for path in ["/settings/profile", "/missing.css"] {
        let fallback = get(&base, path).await;
        assert_eq!(fallback.status(), StatusCode::OK, "{path} should fall back");
        assert_eq!(fallback.text().await.expect("body"), INDEX_HTML);
    }

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies that `/api/*` never falls through to the frontend.
///
/// **BUG THIS CATCHES**: Would catch the SPA fallback shadowing API routes,
/// which makes a mistyped endpoint return HTML that fails JSON parsing in
/// confusing ways. Also pins the prefix boundary: `/apifoo` is a frontend
/// route, not an API path.
#[tokio::test]
async fn given_packaged_backend_when_requesting_unknown_api_path_then_returns_json_404() {
    // GIVEN: A running packaged backend
    let bundle = create_bundle();
    let coordinator = HostCoordinator::new(packaged_config(&bundle));
    let descriptor = coordinator.start().await.expect("Failed to start backend");

    // WHEN / THEN: Every path under the API prefix answers a JSON 404
    for path in ["/api", "/api/", "/api/unknown", "/api/metadata/extra"] {
        let response = get(descriptor.backend_uri(), path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");

        let body: Value = response.json().await.expect("404 body should be JSON");
        assert_eq!(body["error"], "not found");
        assert_eq!(body["path"], path);
    }

    // WHEN / THEN: A path that only shares the prefix text gets the frontend
    let lookalike = get(descriptor.backend_uri(), "/apifoo").await;
    assert_eq!(lookalike.status(), StatusCode::OK);
    assert_eq!(lookalike.text().await.expect("body"), INDEX_HTML);

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies permissive CORS on simple and preflight requests.
///
/// **WHY THIS MATTERS**: In development mode the frontend runs on another
/// origin (`localhost:4200`) and calls this backend directly.
#[tokio::test]
async fn given_cross_origin_requests_when_sent_then_cors_allows_any_origin() {
    // GIVEN: A running development backend
    let coordinator = HostCoordinator::new(development_config());
    let descriptor = coordinator.start().await.expect("Failed to start backend");
    let url = descriptor
        .backend_uri()
        .join("/api/metadata")
        .expect("metadata URL");
    let client = Client::new();

    // WHEN: Sending a simple cross-origin GET
    let simple = client
        .get(url.clone())
        .header("Origin", "http://localhost:4200")
        .send()
        .await
        .expect("GET failed");

    // THEN: Any origin is allowed
    assert_eq!(simple.status(), StatusCode::OK);
    assert_eq!(
        simple.headers()["access-control-allow-origin"],
        "*"
    );

    // WHEN: Sending a preflight
    let preflight = client
        .request(Method::OPTIONS, url)
        .header("Origin", "http://localhost:4200")
        .header("Access-Control-Request-Method", "PUT")
        .header("Access-Control-Request-Headers", "x-custom-header")
        .send()
        .await
        .expect("OPTIONS failed");

    // THEN: The preflight succeeds for arbitrary methods and headers
    assert!(preflight.status().is_success());
    assert!(preflight.headers().contains_key("access-control-allow-methods"));
    assert!(preflight.headers().contains_key("access-control-allow-headers"));

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies development mode serves only the API.
#[tokio::test]
async fn given_development_backend_when_requesting_root_then_frontend_is_not_served() {
    // GIVEN: A development backend
    let coordinator = HostCoordinator::new(development_config());
    let descriptor = coordinator.start().await.expect("Failed to start backend");

    // WHEN: Requesting the root document and metadata
    let root = get(descriptor.backend_uri(), "/").await;
    let metadata = get(descriptor.backend_uri(), "/api/metadata").await;

    // THEN: No frontend, only the JSON 404 also used for unknown API paths
    assert_eq!(root.status(), StatusCode::NOT_FOUND);
    let body: Value = root.json().await.expect("404 body should be JSON");
    assert_eq!(body, serde_json::json!({ "error": "not found", "path": "/" }));

    // AND: The API reports the development environment
    let record: MetadataRecord = metadata.json().await.expect("Invalid metadata JSON");
    assert_eq!(record.environment, "Development");

    coordinator.stop(descriptor).await.expect("Failed to stop backend");
}

/// **VALUE**: Verifies in-flight requests complete during graceful shutdown.
#[tokio::test]
async fn given_in_flight_request_when_shutting_down_within_grace_then_request_completes() {
    // GIVEN: A server whose only route takes a moment to answer
    let router = Router::new().route(
        "/slow",
        get_route(|| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            "done"
        }),
    );
    let port = allocate_ephemeral().expect("Failed to allocate port");
    let handle = start_server(router, port).await.expect("Failed to start server");
    let url = Url::parse(&format!("http://127.0.0.1:{port}/slow")).expect("URL");

    let request = tokio::spawn(async move { Client::new().get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // WHEN: Shutting down with a generous grace period
    let shutdown = handle.shutdown(Duration::from_secs(5)).await;

    // THEN: Shutdown is clean and the request got its answer
    assert!(shutdown.is_ok(), "shutdown should be clean: {shutdown:?}");
    let response = request
        .await
        .expect("request task panicked")
        .expect("in-flight request should complete");
    assert_eq!(response.text().await.expect("body"), "done");
}

/// Sets its flag when dropped, marking that a handler future was torn down.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// **VALUE**: Verifies the grace period is enforced.
///
/// **WHY THIS MATTERS**: A hung request must not keep the process alive
/// after the user closed the window.
///
/// **BUG THIS CATCHES**: Would catch a force close that only stops the
/// accept loop while connection tasks keep serving the hung request.
#[tokio::test]
async fn given_hung_request_when_grace_expires_then_shutdown_force_closes() {
    // GIVEN: A server with a request that never finishes in time
    let handler_dropped = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&handler_dropped);
    let router = Router::new().route(
        "/hang",
        get_route(move || {
            let guard = DropFlag(Arc::clone(&flag));
            async move {
                let _guard = guard;
                tokio::time::sleep(Duration::from_secs(30)).await;
                "late"
            }
        }),
    );
    let port = allocate_ephemeral().expect("Failed to allocate port");
    let handle = start_server(router, port).await.expect("Failed to start server");
    let url = Url::parse(&format!("http://127.0.0.1:{port}/hang")).expect("URL");

    let request = tokio::spawn(async move { Client::new().get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // WHEN: Shutting down with a short grace period
    let shutdown = handle.shutdown(Duration::from_millis(200)).await;

    // THEN: Timeout is reported
    assert!(matches!(
        shutdown,
        Err(host_core::error::shutdown::ShutdownError::Timeout { .. })
    ));

    // AND: The client is cut off promptly instead of waiting for the handler
    let outcome = tokio::time::timeout(Duration::from_secs(5), request)
        .await
        .expect("hung request should be cut off, not served to completion")
        .expect("request task panicked");
    assert!(outcome.is_err(), "hung request should be aborted");

    // AND: The handler itself was cancelled
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(handler_dropped.load(Ordering::SeqCst));
}
