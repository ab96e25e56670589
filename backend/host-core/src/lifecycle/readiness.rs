//! Polling the metadata endpoint until the backend answers.

use crate::METADATA_ROUTE;
use crate::error::startup::StartupError;

use common::{ErrorLocation, HttpStatusCode};
use models::MetadataRecord;

use std::panic::Location;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace};
use reqwest::Client;
use tokio::time::sleep as TokioSleep;
use url::Url;

const PROBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

enum Probe {
    Ready(MetadataRecord),
    Retry(String),
    Fatal(String),
}

/// Wait until `GET {backend_uri}/api/metadata` returns a valid record.
///
/// Connection failures and transient statuses (429, 502, 503, 504) are
/// retried with exponential backoff for up to `max_elapsed`.
///
/// # Errors
///
/// Returns [`StartupError::NotReady`] when the backend answers with a
/// non-retryable status or malformed body, or does not answer in time.
pub async fn wait_until_ready(
    backend_uri: &Url,
    max_elapsed: Duration,
) -> Result<MetadataRecord, StartupError> {
    let url = backend_uri.join(METADATA_ROUTE)?;
    let client = Client::new();
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };

    debug!("Waiting for backend at {url}");

    loop {
        let reason = match probe(&client, &url).await {
            Probe::Ready(record) => {
                info!("Backend is answering at {backend_uri}");
                return Ok(record);
            }
            Probe::Fatal(reason) => {
                return Err(StartupError::NotReady {
                    message: format!("Backend at {url} is not usable: {reason}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Probe::Retry(reason) => reason,
        };

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Backend not ready ({reason}), retrying after {duration:?}");
                TokioSleep(duration).await;
            }
            None => {
                return Err(StartupError::NotReady {
                    message: format!(
                        "Backend at {url} did not answer within {max_elapsed:?}: {reason}"
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }
}

async fn probe(client: &Client, url: &Url) -> Probe {
    let response = match client
        .get(url.clone())
        .timeout(PROBE_REQUEST_TIMEOUT)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return Probe::Retry(e.to_string()),
    };

    let status = HttpStatusCode::from(response.status().as_u16());

    if status.is_success() {
        return match response.json::<MetadataRecord>().await {
            Ok(record) => Probe::Ready(record),
            Err(e) => Probe::Fatal(format!("invalid metadata body: {e}")),
        };
    }

    if status.is_retryable() {
        Probe::Retry(format!("status {}", status.0))
    } else {
        Probe::Fatal(format!("status {}", status.0))
    }
}
