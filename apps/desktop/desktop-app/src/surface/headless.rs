use crate::error::ShellError;
use crate::surface::{DisplaySurface, ShutdownHook};

use common::ErrorLocation;

use std::panic::Location;

use log::{info, warn};
use tokio::signal::ctrl_c;
use url::Url;

/// Serves the frontend without opening a window, until Ctrl+C.
///
/// Used when the crate is built without the `webview` feature; the
/// frontend can be opened in any browser.
#[derive(Debug, Default)]
pub struct HeadlessSurface;

impl DisplaySurface for HeadlessSurface {
    fn present(
        self: Box<Self>,
        frontend_uri: &Url,
        on_close: ShutdownHook,
    ) -> Result<(), ShellError> {
        info!("Running headless, open {frontend_uri} in a browser");
        info!("Press Ctrl+C to stop");

        let signal = on_close.runtime().block_on(ctrl_c());

        match signal {
            Ok(()) => {
                info!("Ctrl+C received");
                on_close.run()
            }
            Err(e) => {
                warn!("Cannot listen for Ctrl+C: {e}");
                on_close.run()?;
                Err(ShellError::Surface {
                    message: format!("Failed to listen for Ctrl+C: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}
