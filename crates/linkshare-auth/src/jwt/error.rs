//! Token validation failures.

use thiserror::Error;

use linkshare_core::error::AppError;

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a decodable token, or required claims are missing.
    #[error("malformed token")]
    Malformed,
    /// Signature, algorithm or issuer does not match this kind's key.
    #[error("invalid token signature")]
    BadSignature,
    /// Well-formed and authentic but past its expiry.
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidKeyFormat => Self::BadSignature,
            _ => Self::Malformed,
        }
    }
}

impl From<TokenError> for AppError {
    #[track_caller]
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::unauthorized("token expired"),
            TokenError::Malformed | TokenError::BadSignature => {
                AppError::unauthorized("invalid token")
            }
        }
    }
}
