//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Token signing, password hashing, and client gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    pub access_token_secret: String,
    /// HMAC secret for refresh tokens. Must differ from the access secret.
    pub refresh_token_secret: String,
    /// Access token TTL in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_seconds: u64,
    /// Refresh token TTL in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_seconds: u64,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Argon2 cost parameters.
    #[serde(default)]
    pub password: PasswordHashConfig,
    /// HTTP Basic credentials required on login and refresh calls.
    #[serde(default)]
    pub basic_client: BasicClientConfig,
}

impl AuthConfig {
    /// Rejects empty or shared secrets and zero TTLs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err(AppError::configuration(
                "auth.access_token_secret and auth.refresh_token_secret must be set",
            ));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AppError::configuration(
                "Access and refresh token secrets must differ",
            ));
        }
        if self.access_token_ttl_seconds == 0 || self.refresh_token_ttl_seconds == 0 {
            return Err(AppError::configuration("Token TTLs must be greater than zero"));
        }
        Ok(())
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of iterations.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Client credentials checked by the Basic gate. Disabled when `username` is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicClientConfig {
    /// Expected Basic username.
    #[serde(default)]
    pub username: String,
    /// Expected Basic password.
    #[serde(default)]
    pub password: String,
}

impl BasicClientConfig {
    /// Whether the gate is active.
    pub fn is_enabled(&self) -> bool {
        !self.username.is_empty()
    }
}

fn default_access_ttl() -> u64 {
    12 * 60 * 60
}

fn default_refresh_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_issuer() -> String {
    "linkshare".to_string()
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
