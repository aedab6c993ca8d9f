//! Session store configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Tiered session store and refresh protocol settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound on the refresh-session lookup during a refresh call, in milliseconds.
    #[serde(default = "default_fetch_timeout")]
    pub refresh_fetch_timeout_ms: u64,
    /// Total attempts for a best-effort session delete (first attempt included).
    #[serde(default = "default_delete_attempts")]
    pub delete_max_attempts: u32,
    /// Fixed wait between delete attempts, in milliseconds.
    #[serde(default = "default_delete_backoff")]
    pub delete_backoff_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_fetch_timeout_ms: default_fetch_timeout(),
            delete_max_attempts: default_delete_attempts(),
            delete_backoff_ms: default_delete_backoff(),
        }
    }
}

impl SessionConfig {
    /// Rejects a zero fetch timeout or zero delete attempts.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.refresh_fetch_timeout_ms == 0 {
            return Err(AppError::configuration(
                "session.refresh_fetch_timeout_ms must be greater than zero",
            ));
        }
        if self.delete_max_attempts == 0 {
            return Err(AppError::configuration(
                "session.delete_max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_fetch_timeout() -> u64 {
    3_000
}

fn default_delete_attempts() -> u32 {
    5
}

fn default_delete_backoff() -> u64 {
    200
}
