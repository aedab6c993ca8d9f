//! Credential (user account) entities.

pub mod model;
pub mod role;

pub use model::{Credential, NewCredential};
pub use role::UserRole;
