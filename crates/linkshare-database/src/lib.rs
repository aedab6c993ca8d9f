//! # linkshare-database
//!
//! PostgreSQL connection management, the repository traits consumed by the
//! auth layer, and their PostgreSQL and in-memory implementations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{CredentialRepository, CredentialTransaction, SessionRepository};
