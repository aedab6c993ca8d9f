//! Credential verification and registration.

pub mod registrar;
pub mod verifier;

pub use registrar::TransactionalRegistrar;
pub use verifier::{AuthError, CredentialVerifier};
