//! Token session entities.
//!
//! A session records the metadata of one issued token: the token string, its
//! expiry and the identity claims it was minted for. Access and refresh
//! sessions share one shape but live in separate collections so that the
//! store layer can be written once and instantiated per kind.

pub mod claims;
pub mod kind;
pub mod record;

pub use claims::UserClaims;
pub use kind::TokenKind;
pub use record::{AccessTokenSession, RefreshTokenSession, SessionRecord};
