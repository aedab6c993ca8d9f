//! Unified application error types for LinkShare.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Internal-severity errors remember the
//! call site that created them so the log line points at the failing
//! repository or store call, while the message shown to clients stays generic.

use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input validation failed.
    Validation,
    /// Authentication failed (invalid credentials, expired or forged token).
    Unauthorized,
    /// The requested resource was not found.
    NotFound,
    /// A conflict occurred (duplicate username or email).
    Conflict,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    ///
    /// Infrastructure kinds are internal-severity and collapse to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal
            | Self::Database
            | Self::Cache
            | Self::Configuration
            | Self::Serialization => 500,
        }
    }

    /// Whether errors of this kind are internal-severity.
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// Generic client-facing text for 400 responses.
pub const GENERIC_BAD_REQUEST: &str = "There is a problem with the request data, please check it and try again";
/// Generic client-facing text for 404 responses.
pub const GENERIC_NOT_FOUND: &str = "Data not found";
/// Generic client-facing text for 500 responses.
pub const GENERIC_INTERNAL: &str = "Something went wrong, please try again later";

/// The unified application error used throughout LinkShare.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message (internal detail for 400/404/500 kinds).
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Call site that created the error; recorded for internal-severity kinds only.
    pub location: Option<&'static Location<'static>>,
}

impl AppError {
    /// Create a new application error.
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            location: kind.is_internal().then(Location::caller),
        }
    }

    /// Create a new application error with an underlying cause.
    #[track_caller]
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
            location: kind.is_internal().then(Location::caller),
        }
    }

    /// Create a validation error.
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an unauthorized error.
    #[track_caller]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a not-found error.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    #[track_caller]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    #[track_caller]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    #[track_caller]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Message safe to return to a client.
    ///
    /// 400, 404 and 500 classes get templated text; everything else passes
    /// the message through verbatim.
    pub fn public_message(&self) -> &str {
        match self.status_code() {
            400 => GENERIC_BAD_REQUEST,
            404 => GENERIC_NOT_FOUND,
            500 => GENERIC_INTERNAL,
            _ => &self.message,
        }
    }

    /// `file:line:column` of the creating call site, if recorded.
    pub fn call_site(&self) -> Option<String> {
        self.location
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
            location: self.location,
        }
    }
}

impl From<serde_json::Error> for AppError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    #[track_caller]
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_record_call_site() {
        let err = AppError::database("insert failed");
        let site = err.call_site().unwrap();
        assert!(site.contains("error.rs"));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn client_errors_do_not_record_call_site() {
        let err = AppError::unauthorized("refresh token expired");
        assert!(err.location.is_none());
    }

    #[test]
    fn public_message_is_templated_for_generic_classes() {
        assert_eq!(
            AppError::validation("please provide either username or email").public_message(),
            GENERIC_BAD_REQUEST
        );
        assert_eq!(AppError::not_found("user 'bob'").public_message(), GENERIC_NOT_FOUND);
        assert_eq!(AppError::cache("redis down").public_message(), GENERIC_INTERNAL);
    }

    #[test]
    fn public_message_passes_through_other_classes() {
        assert_eq!(
            AppError::unauthorized("refresh token expired").public_message(),
            "refresh token expired"
        );
        assert_eq!(
            AppError::conflict("username or email already taken").public_message(),
            "username or email already taken"
        );
    }
}
