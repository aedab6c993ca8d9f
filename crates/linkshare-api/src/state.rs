//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use linkshare_auth::AuthService;
use linkshare_core::config::BasicClientConfig;

/// Application state passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Login, refresh, registration and access-token checks.
    pub auth: Arc<AuthService>,
    /// Client credentials for the Basic gate.
    pub basic_client: Arc<BasicClientConfig>,
}

impl AppState {
    /// Create application state.
    pub fn new(auth: AuthService, basic_client: BasicClientConfig) -> Self {
        Self {
            auth: Arc::new(auth),
            basic_client: Arc::new(basic_client),
        }
    }
}
