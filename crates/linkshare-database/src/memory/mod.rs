//! In-memory repository implementations.
//!
//! Used by the test suites and for running the server without PostgreSQL.
//! Both repositories can be switched into a failing mode to exercise the
//! error paths of the layers above them.

pub mod credential;
pub mod session;

pub use credential::MemoryCredentialRepository;
pub use session::MemorySessionRepository;
