//! Account registration inside one durable unit of work.

use std::sync::Arc;

use tracing::{info, warn};

use linkshare_core::error::{AppError, ErrorKind};
use linkshare_core::result::AppResult;
use linkshare_database::CredentialRepository;
use linkshare_entity::credential::{Credential, NewCredential, UserRole};

use crate::password::PasswordHasher;

/// Creates credentials transactionally: a failed insert leaves no row.
#[derive(Debug, Clone)]
pub struct TransactionalRegistrar {
    repo: Arc<dyn CredentialRepository>,
    hasher: Arc<PasswordHasher>,
}

impl TransactionalRegistrar {
    /// Create a registrar.
    pub fn new(repo: Arc<dyn CredentialRepository>, hasher: Arc<PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Register a new member account.
    ///
    /// Duplicate username or email yields `Conflict`; any insert failure is
    /// rolled back before it is returned.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<Credential> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.trim().is_empty() {
            return Err(AppError::validation(
                "username, email and password are required",
            ));
        }

        let hasher = Arc::clone(&self.hasher);
        let plaintext = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash_password(&plaintext))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))??;

        let new = NewCredential {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role: UserRole::Member,
        };

        let mut tx = self.repo.begin().await?;
        match tx.insert(&new).await {
            Ok(credential) => {
                tx.commit().await?;
                info!(user_id = credential.id, username = %credential.username, "User registered");
                Ok(credential)
            }
            Err(insert_err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed registration failed");
                    return Err(AppError::with_source(
                        ErrorKind::Internal,
                        format!("Rollback failed after insert error: {insert_err}"),
                        rollback_err,
                    ));
                }
                if insert_err.kind == ErrorKind::Conflict {
                    return Err(AppError::conflict("username or email already taken"));
                }
                Err(insert_err)
            }
        }
    }
}
