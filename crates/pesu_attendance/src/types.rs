use crate::portal::PortalClient;

/// State shared by every request handler.
///
/// Holds no per-user data: each request logs in with its own session.
pub struct AppState {
    /// Client for the portal. Only carries configuration.
    pub client: PortalClient,
}

impl AppState {
    pub fn new(client: PortalClient) -> Self {
        Self { client }
    }
}
