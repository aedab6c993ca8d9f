//! Token kind discriminator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two independent token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer credential.
    Access,
    /// Long-lived credential exchanged for new access tokens.
    Refresh,
}

impl TokenKind {
    /// Table name and cache key namespace for sessions of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Access => "access_token_sessions",
            Self::Refresh => "refresh_token_sessions",
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
