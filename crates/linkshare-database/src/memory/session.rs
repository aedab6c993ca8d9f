//! In-memory session repository, generic over the token kind.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use linkshare_core::error::AppError;
use linkshare_core::result::AppResult;
use linkshare_entity::session::SessionRecord;

use crate::repositories::SessionRepository;

/// Session rows keyed by owning user id.
#[derive(Debug)]
pub struct MemorySessionRepository<R> {
    rows: Arc<DashMap<i64, R>>,
    unavailable: Arc<AtomicBool>,
}

impl<R> Clone for MemorySessionRepository<R> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            unavailable: Arc::clone(&self.unavailable),
        }
    }
}

impl<R: SessionRecord> Default for MemorySessionRepository<R> {
    fn default() -> Self {
        Self {
            rows: Arc::new(DashMap::new()),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<R: SessionRecord> MemorySessionRepository<R> {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with a database error while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Raw row for `user_id`, including expired ones.
    pub fn raw(&self, user_id: i64) -> Option<R> {
        self.rows.get(&user_id).map(|r| r.value().clone())
    }

    /// Number of stored rows, including expired ones.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database(format!(
                "{} table unavailable",
                R::KIND.collection()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: SessionRecord> SessionRepository<R> for MemorySessionRepository<R> {
    async fn upsert(&self, session: &R) -> AppResult<()> {
        self.check_available()?;
        let taken = self
            .rows
            .iter()
            .any(|e| e.value().token() == session.token() && *e.key() != session.user_id());
        if taken {
            return Err(AppError::database(format!(
                "duplicate token in {}",
                R::KIND.collection()
            )));
        }
        self.rows.insert(session.user_id(), session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<R>> {
        self.check_available()?;
        let now = Utc::now();
        Ok(self
            .rows
            .iter()
            .find(|e| e.value().token() == token && !e.value().is_expired_at(now))
            .map(|e| e.value().clone()))
    }

    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Option<R>> {
        self.check_available()?;
        let now = Utc::now();
        Ok(self
            .rows
            .get(&user_id)
            .map(|r| r.value().clone())
            .filter(|r| !r.is_expired_at(now)))
    }

    async fn delete_by_user_id(&self, user_id: i64, token: Option<&str>) -> AppResult<u64> {
        self.check_available()?;
        let removed = self
            .rows
            .remove_if(&user_id, |_, r| token.is_none_or(|t| r.token() == t));
        Ok(u64::from(removed.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use linkshare_entity::session::{AccessTokenSession, UserClaims};

    fn session(user_id: i64, token: &str, ttl_secs: i64) -> AccessTokenSession {
        AccessTokenSession::new(
            token.to_string(),
            Utc::now() + Duration::seconds(ttl_secs),
            UserClaims {
                id: user_id,
                username: format!("user{user_id}"),
                email: format!("user{user_id}@example.com"),
            },
        )
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_session() {
        let repo = MemorySessionRepository::<AccessTokenSession>::new();
        repo.upsert(&session(1, "old", 60)).await.unwrap();
        repo.upsert(&session(1, "new", 60)).await.unwrap();

        assert_eq!(repo.len(), 1);
        assert!(repo.find_by_token("old").await.unwrap().is_none());
        assert_eq!(repo.find_by_user_id(1).await.unwrap().unwrap().token, "new");
    }

    #[tokio::test]
    async fn test_expired_rows_are_hidden() {
        let repo = MemorySessionRepository::<AccessTokenSession>::new();
        repo.upsert(&session(2, "gone", -5)).await.unwrap();
        assert!(repo.find_by_user_id(2).await.unwrap().is_none());
        assert!(repo.find_by_token("gone").await.unwrap().is_none());
        assert!(repo.raw(2).is_some());
    }

    #[tokio::test]
    async fn test_guarded_delete_spares_newer_token() {
        let repo = MemorySessionRepository::<AccessTokenSession>::new();
        repo.upsert(&session(3, "newer", 60)).await.unwrap();

        assert_eq!(repo.delete_by_user_id(3, Some("older")).await.unwrap(), 0);
        assert!(repo.raw(3).is_some());
        assert_eq!(repo.delete_by_user_id(3, Some("newer")).await.unwrap(), 1);
        assert!(repo.raw(3).is_none());
    }

    #[tokio::test]
    async fn test_unavailable_fails_operations() {
        let repo = MemorySessionRepository::<AccessTokenSession>::new();
        repo.set_unavailable(true);
        assert!(repo.upsert(&session(4, "t", 60)).await.is_err());
        repo.set_unavailable(false);
        assert!(repo.upsert(&session(4, "t", 60)).await.is_ok());
    }
}
