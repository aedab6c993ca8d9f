//! Background task supervision for LinkShare.
//!
//! This crate provides:
//! - A process-owned task pool with bounded concurrency and backlog
//! - Fixed-backoff retries for best-effort side effects
//! - Graceful drain with a deadline at shutdown

pub mod retry;
pub mod supervisor;

pub use retry::RetryPolicy;
pub use supervisor::TaskSupervisor;
