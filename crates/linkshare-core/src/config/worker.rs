//! Background task pool configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Deferred task supervisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of background tasks allowed to run at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Maximum number of submitted-but-unfinished tasks before new ones are dropped.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
    /// How long shutdown waits for in-flight tasks, in seconds.
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_pending: default_max_pending(),
            drain_timeout_seconds: default_drain_timeout(),
        }
    }
}

impl WorkerConfig {
    /// Rejects a pool that could never run anything.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.concurrency == 0 || self.max_pending == 0 {
            return Err(AppError::configuration(
                "worker.concurrency and worker.max_pending must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_concurrency() -> usize {
    16
}

fn default_max_pending() -> usize {
    10_000
}

fn default_drain_timeout() -> u64 {
    10
}
