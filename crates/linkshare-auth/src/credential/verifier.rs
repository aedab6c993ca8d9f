//! Login credential verification.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use linkshare_core::error::AppError;
use linkshare_database::CredentialRepository;
use linkshare_entity::credential::Credential;
use linkshare_entity::session::UserClaims;

use crate::password::PasswordHasher;

/// Client-facing text for every credential mismatch.
pub const INVALID_CREDENTIALS: &str = "username or email or password is not valid";

/// Why a login attempt failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Neither username nor email was supplied.
    #[error("please provide either username or email")]
    MissingIdentifier,
    /// No account matches the identifier.
    #[error("account not found")]
    NotFound,
    /// The password does not match.
    #[error("password mismatch")]
    InvalidCredential,
    /// The credential store failed.
    #[error(transparent)]
    Storage(#[from] AppError),
}

impl From<AuthError> for AppError {
    #[track_caller]
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingIdentifier => {
                AppError::validation("please provide either username or email")
            }
            AuthError::NotFound | AuthError::InvalidCredential => {
                AppError::unauthorized(INVALID_CREDENTIALS)
            }
            AuthError::Storage(inner) => inner,
        }
    }
}

/// Checks username-or-email plus password against stored hashes.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    repo: Arc<dyn CredentialRepository>,
    hasher: Arc<PasswordHasher>,
}

impl CredentialVerifier {
    /// Create a verifier.
    pub fn new(repo: Arc<dyn CredentialRepository>, hasher: Arc<PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Look up the account (username wins when both are given) and check
    /// the password.
    ///
    /// An unknown account still pays for one hash verification.
    pub async fn verify(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserClaims, AuthError> {
        let found = if !username.is_empty() {
            self.repo.find_by_username(username).await?
        } else if !email.is_empty() {
            self.repo.find_by_email(email).await?
        } else {
            return Err(AuthError::MissingIdentifier);
        };

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let stored_hash = found.as_ref().map(|c: &Credential| c.password_hash.clone());

        let matched = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify_password(&password, &hash).map(Some),
            None => {
                hasher.verify_dummy(&password);
                Ok(None)
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))??;

        match (found, matched) {
            (Some(credential), Some(true)) => Ok(credential.claims()),
            (Some(credential), _) => {
                debug!(user_id = credential.id, "Password mismatch");
                Err(AuthError::InvalidCredential)
            }
            (None, _) => {
                debug!("Login for unknown account");
                Err(AuthError::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkshare_core::config::PasswordHashConfig;
    use linkshare_core::error::ErrorKind;
    use linkshare_database::memory::MemoryCredentialRepository;
    use linkshare_entity::credential::{NewCredential, UserRole};

    async fn setup() -> CredentialVerifier {
        let hasher = Arc::new(
            PasswordHasher::new(&PasswordHashConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        );
        let repo = MemoryCredentialRepository::new();
        let mut tx = repo.begin().await.unwrap();
        tx.insert(&NewCredential {
            username: "frank".to_string(),
            email: "frank@example.com".to_string(),
            password_hash: hasher.hash_password("s3cret").unwrap(),
            role: UserRole::Member,
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();
        CredentialVerifier::new(Arc::new(repo), hasher)
    }

    #[tokio::test]
    async fn test_username_or_email_login() {
        let verifier = setup().await;
        let by_name = verifier.verify("frank", "", "s3cret").await.unwrap();
        let by_email = verifier.verify("", "frank@example.com", "s3cret").await.unwrap();
        assert_eq!(by_name, by_email);
        assert_eq!(by_name.username, "frank");
    }

    #[tokio::test]
    async fn test_username_takes_precedence() {
        let verifier = setup().await;
        let err = verifier
            .verify("nobody", "frank@example.com", "s3cret")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn test_failures_collapse_to_same_message() {
        let verifier = setup().await;
        let wrong = AppError::from(verifier.verify("frank", "", "nope").await.unwrap_err());
        let missing = AppError::from(verifier.verify("ghost", "", "s3cret").await.unwrap_err());
        assert_eq!(wrong.kind, ErrorKind::Unauthorized);
        assert_eq!(wrong.public_message(), missing.public_message());
    }

    #[tokio::test]
    async fn test_missing_identifier_is_validation() {
        let verifier = setup().await;
        let err = AppError::from(verifier.verify("", "", "s3cret").await.unwrap_err());
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
