//! Signed bearer tokens.

pub mod claims;
pub mod error;
pub mod issuer;

pub use claims::{TokenClaims, peek_owner};
pub use error::TokenError;
pub use issuer::{MintedToken, TokenIssuer, TokenPair};
