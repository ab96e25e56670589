use crate::error::ShellError;
use crate::surface::{DisplaySurface, ShutdownHook};

use common::ErrorLocation;

use std::panic::Location;

use log::{error, info};
use tauri::{RunEvent, WebviewUrl, WebviewWindowBuilder};
use url::Url;

const MAIN_WINDOW_LABEL: &str = "main";
const WINDOW_TITLE: &str = "DesktopApp";

/// Native window hosting the frontend, backed by Tauri.
///
/// The window opens maximized and resizable. Closing the last window ends
/// the event loop; the backend is stopped on [`RunEvent::Exit`].
#[derive(Debug, Default)]
pub struct WebviewSurface;

impl DisplaySurface for WebviewSurface {
    fn present(
        self: Box<Self>,
        frontend_uri: &Url,
        on_close: ShutdownHook,
    ) -> Result<(), ShellError> {
        // Share the backend runtime instead of letting Tauri build its own.
        tauri::async_runtime::set(on_close.runtime().clone());

        let url = frontend_uri.clone();
        let app = tauri::Builder::default()
            .setup(move |app| {
                info!("Opening window at {url}");
                WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, WebviewUrl::External(url))
                    .title(WINDOW_TITLE)
                    .resizable(true)
                    .maximized(true)
                    .build()?;
                Ok(())
            })
            .build(tauri::generate_context!())
            .map_err(|e| ShellError::Surface {
                message: format!("Failed to build window: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let mut on_close = Some(on_close);

        // On some platforms `run` never returns, so shutdown happens here.
        app.run(move |_app, event| {
            if let RunEvent::Exit = event
                && let Some(hook) = on_close.take()
            {
                info!("Window closed");
                if let Err(e) = hook.run() {
                    error!("Shutdown after window close failed: {e}");
                }
                log::logger().flush();
            }
        });

        Ok(())
    }
}
