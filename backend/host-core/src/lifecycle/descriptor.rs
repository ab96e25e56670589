use crate::server::ServerHandle;

use url::Url;
use uuid::Uuid;

/// The running backend as seen by the shell.
///
/// Owns the server handle exclusively. Passing the descriptor to
/// [`HostCoordinator::stop`](crate::lifecycle::HostCoordinator::stop) consumes
/// it, so a descriptor can be stopped at most once.
#[derive(Debug)]
pub struct ServerDescriptor {
    instance_id: Uuid,
    handle: ServerHandle,
    backend_uri: Url,
    frontend_uri: Url,
}

impl ServerDescriptor {
    pub(crate) fn new(handle: ServerHandle, backend_uri: Url, frontend_uri: Url) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            handle,
            backend_uri,
            frontend_uri,
        }
    }

    /// Identifier used to correlate log lines of one backend instance.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// `http://127.0.0.1:<port>/` of the embedded server.
    pub fn backend_uri(&self) -> &Url {
        &self.backend_uri
    }

    /// Address the display surface should load.
    ///
    /// Equal to [`Self::backend_uri`] in packaged mode; the external dev
    /// server in development mode.
    pub fn frontend_uri(&self) -> &Url {
        &self.frontend_uri
    }

    pub fn port(&self) -> u16 {
        self.handle.local_addr().port()
    }

    pub fn is_serving(&self) -> bool {
        !self.handle.is_finished()
    }

    pub(crate) fn into_handle(self) -> ServerHandle {
        self.handle
    }
}
