//! In-memory credential repository with staged transactions.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use linkshare_core::error::AppError;
use linkshare_core::result::AppResult;
use linkshare_entity::credential::{Credential, NewCredential};

use crate::repositories::{CredentialRepository, CredentialTransaction};

#[derive(Debug, Default)]
struct Inner {
    rows: Mutex<Vec<Credential>>,
    next_id: AtomicI64,
    fail_inserts: AtomicBool,
}

impl Inner {
    fn rows(&self) -> AppResult<MutexGuard<'_, Vec<Credential>>> {
        self.rows
            .lock()
            .map_err(|_| AppError::database("Credential table lock poisoned"))
    }
}

/// Credential repository holding rows in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialRepository {
    inner: Arc<Inner>,
}

impl MemoryCredentialRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent inserts fail with a database error.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.inner.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of committed rows.
    pub fn len(&self) -> usize {
        self.inner.rows().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Whether no rows are committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn conflicts(rows: &[Credential], candidate: &NewCredential) -> bool {
    rows.iter()
        .any(|c| c.username == candidate.username || c.email == candidate.email)
}

#[async_trait]
impl CredentialRepository for MemoryCredentialRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Credential>> {
        Ok(self
            .inner
            .rows()?
            .iter()
            .find(|c| c.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        Ok(self.inner.rows()?.iter().find(|c| c.email == email).cloned())
    }

    async fn begin(&self) -> AppResult<Box<dyn CredentialTransaction>> {
        Ok(Box::new(MemoryCredentialTransaction {
            inner: Arc::clone(&self.inner),
            staged: Vec::new(),
        }))
    }
}

/// Inserts are staged locally and only become visible on commit.
struct MemoryCredentialTransaction {
    inner: Arc<Inner>,
    staged: Vec<Credential>,
}

#[async_trait]
impl CredentialTransaction for MemoryCredentialTransaction {
    async fn insert(&mut self, credential: &NewCredential) -> AppResult<Credential> {
        if self.inner.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::database("Failed to insert user"));
        }
        {
            let rows = self.inner.rows()?;
            if conflicts(&rows, credential) || conflicts(&self.staged, credential) {
                return Err(AppError::conflict("username or email already taken"));
            }
        }

        let now = Utc::now();
        let row = Credential {
            id: self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: credential.username.clone(),
            email: credential.email.clone(),
            password_hash: credential.password_hash.clone(),
            role: credential.role,
            created_at: now,
            updated_at: now,
        };
        self.staged.push(row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut rows = self.inner.rows()?;
        for row in &self.staged {
            let duplicate = rows
                .iter()
                .any(|c| c.username == row.username || c.email == row.email);
            if duplicate {
                return Err(AppError::conflict("username or email already taken"));
            }
        }
        rows.extend(self.staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
