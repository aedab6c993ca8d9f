//! Credential repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use linkshare_core::error::{AppError, ErrorKind};
use linkshare_core::result::AppResult;
use linkshare_entity::credential::{Credential, NewCredential};

use super::{CredentialRepository, CredentialTransaction};

const SELECT_COLUMNS: &str =
    "SELECT id, username, email, password_hash, role, created_at, updated_at FROM users";

/// PostgreSQL-backed credential repository over the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialRepository {
    pool: PgPool,
}

impl PgCredentialRepository {
    /// Create a new credential repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, Credential>(&format!("{SELECT_COLUMNS} WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, Credential>(&format!("{SELECT_COLUMNS} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn begin(&self) -> AppResult<Box<dyn CredentialTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgCredentialTransaction { tx }))
    }
}

/// An open PostgreSQL transaction on the `users` table.
pub struct PgCredentialTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CredentialTransaction for PgCredentialTransaction {
    async fn insert(&mut self, credential: &NewCredential) -> AppResult<Credential> {
        sqlx::query_as::<_, Credential>(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, email, password_hash, role, created_at, updated_at",
        )
        .bind(&credential.username)
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .bind(credential.role)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique {
                AppError::with_source(ErrorKind::Conflict, "username or email already taken", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to insert user", e)
            }
        })
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx.rollback().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
        })
    }
}
