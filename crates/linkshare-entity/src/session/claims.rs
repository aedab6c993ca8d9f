//! Identity claims carried by tokens and sessions.

use serde::{Deserialize, Serialize};

/// Identity projection of a credential embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Owning user id.
    pub id: i64,
    /// Username at issuance.
    pub username: String,
    /// Email at issuance.
    pub email: String,
}
