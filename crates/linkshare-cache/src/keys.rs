//! Cache key builders.
//!
//! Keys are relative; providers apply the configured global prefix.

use linkshare_entity::session::TokenKind;

/// Key of the cached session of `kind` owned by `user_id`.
pub fn session(kind: TokenKind, user_id: i64) -> String {
    format!("{}:{user_id}", kind.collection())
}
