//! Session storage and the refresh protocol.

pub mod refresh;
pub mod store;

pub use refresh::{RefreshCoordinator, RefreshPhase};
pub use store::{DeleteOutcome, TieredSessionStore};
