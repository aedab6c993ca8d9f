//! # linkshare-auth
//!
//! Authentication and session management for LinkShare.
//!
//! ## Modules
//!
//! - `jwt`: signed token minting and validation, one secret per token kind
//! - `password`: Argon2id password hashing
//! - `credential`: login credential verification and transactional registration
//! - `session`: tiered (cache + durable) session store and the refresh protocol
//! - `service`: the use cases consumed by the HTTP layer

pub mod credential;
pub mod jwt;
pub mod password;
pub mod service;
pub mod session;

pub use credential::{AuthError, CredentialVerifier, TransactionalRegistrar};
pub use jwt::{MintedToken, TokenClaims, TokenError, TokenIssuer, TokenPair};
pub use password::PasswordHasher;
pub use service::{AuthBackends, AuthService, LoginRequest, RegisterRequest};
pub use session::{RefreshCoordinator, RefreshPhase, TieredSessionStore};
