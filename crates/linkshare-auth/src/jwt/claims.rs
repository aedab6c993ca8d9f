//! JWT claims structure shared by access and refresh tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use linkshare_entity::session::UserClaims;

/// Payload of every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Owning user id.
    pub id: i64,
    /// Username at issuance.
    pub username: String,
    /// Email at issuance.
    pub email: String,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Issuer.
    pub iss: String,
    /// Unique token id; keeps two tokens minted in the same second distinct.
    pub jti: Uuid,
}

impl TokenClaims {
    /// Identity part of the payload.
    pub fn user(&self) -> UserClaims {
        UserClaims {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Deserialize)]
struct Owner {
    id: i64,
}

/// Read the `id` claim without verifying the token.
///
/// Only for choosing a cache key; the result must never be trusted as an
/// identity.
pub fn peek_owner(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice::<Owner>(&bytes).ok().map(|o| o.id)
}
