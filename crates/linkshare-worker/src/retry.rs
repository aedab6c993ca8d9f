//! Retry policy for supervised tasks.

use std::time::Duration;

/// How often and how patiently a failing task is re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included. Zero is treated as one.
    pub max_attempts: u32,
    /// Fixed wait between attempts.
    pub backoff: Duration,
    /// Wait before the first attempt.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Policy that starts immediately.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            initial_delay: Duration::ZERO,
        }
    }

    /// Delay the first attempt, e.g. when an inline attempt already failed.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Attempts that will actually be made.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait before attempt number `attempt` (1-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            self.initial_delay
        } else {
            self.backoff
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_attempts_still_runs_once() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts(), 1);
    }

    #[test]
    fn test_delays() {
        let policy = RetryPolicy::new(3, Duration::from_millis(200))
            .with_initial_delay(Duration::from_millis(50));
        assert_eq!(policy.delay_before(1), Duration::from_millis(50));
        assert_eq!(policy.delay_before(2), Duration::from_millis(200));
        assert_eq!(RetryPolicy::default().delay_before(1), Duration::ZERO);
    }
}
