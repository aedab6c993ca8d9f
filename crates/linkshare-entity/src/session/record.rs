//! Session record trait and the two concrete session types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::claims::UserClaims;
use super::kind::TokenKind;

/// Common shape of a per-kind session record.
///
/// Implementors are plain value types; every record is written to a tier as
/// a single unit so its token and expiry can never be observed mixed with
/// another record's.
pub trait SessionRecord:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Which kind of token this record describes.
    const KIND: TokenKind;

    /// Build a record.
    fn new(token: String, expires_at: DateTime<Utc>, claims: UserClaims) -> Self;

    /// The issued token string.
    fn token(&self) -> &str;

    /// Absolute expiry, equal to the token's `exp` claim.
    fn expires_at(&self) -> DateTime<Utc>;

    /// Claims the token was minted for.
    fn claims(&self) -> &UserClaims;

    /// Owning user id.
    fn user_id(&self) -> i64 {
        self.claims().id
    }

    /// Whether the record has expired relative to `now`.
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() <= now
    }

    /// Whether the record has expired.
    fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Time left until expiry, or `None` once expired.
    fn remaining_ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expires_at() - now)
            .to_std()
            .ok()
            .filter(|d| !d.is_zero())
    }
}

/// Metadata of an issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenSession {
    /// The signed access token.
    #[serde(rename = "access_token")]
    pub token: String,
    /// Expiry of the token.
    #[serde(rename = "exp")]
    pub expires_at: DateTime<Utc>,
    /// Identity the token was minted for.
    #[serde(rename = "user_data")]
    pub claims: UserClaims,
}

/// Metadata of an issued refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenSession {
    /// The signed refresh token.
    #[serde(rename = "refresh_token")]
    pub token: String,
    /// Expiry of the token.
    #[serde(rename = "exp")]
    pub expires_at: DateTime<Utc>,
    /// Identity the token was minted for.
    #[serde(rename = "user_data")]
    pub claims: UserClaims,
}

macro_rules! impl_session_record {
    ($ty:ty, $kind:expr) => {
        impl SessionRecord for $ty {
            const KIND: TokenKind = $kind;

            fn new(token: String, expires_at: DateTime<Utc>, claims: UserClaims) -> Self {
                Self {
                    token,
                    expires_at,
                    claims,
                }
            }

            fn token(&self) -> &str {
                &self.token
            }

            fn expires_at(&self) -> DateTime<Utc> {
                self.expires_at
            }

            fn claims(&self) -> &UserClaims {
                &self.claims
            }
        }
    };
}

impl_session_record!(AccessTokenSession, TokenKind::Access);
impl_session_record!(RefreshTokenSession, TokenKind::Refresh);
