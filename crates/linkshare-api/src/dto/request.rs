//! Request DTOs.

use serde::Deserialize;

pub use linkshare_auth::{LoginRequest, RegisterRequest};

/// Refresh payload used when the token is not sent as a bearer header.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefreshRequest {
    /// Refresh token previously issued at login.
    pub refresh_token: String,
}
