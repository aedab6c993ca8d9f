//! Two-tier session store: a volatile cache in front of the durable table.
//!
//! The durable tier is the source of truth. Writes go to both tiers at once;
//! only a durable failure reaches the caller. Deletes are attempted inline on
//! both tiers and any failed tier is retried in the background, guarded by
//! the superseded token so a retry can never remove a newer session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use linkshare_cache::{CacheManager, codec, keys};
use linkshare_core::config::SessionConfig;
use linkshare_core::result::AppResult;
use linkshare_core::traits::CacheProvider;
use linkshare_database::SessionRepository;
use linkshare_entity::session::SessionRecord;
use linkshare_worker::{RetryPolicy, TaskSupervisor};

use crate::jwt::peek_owner;

/// What happened to each tier during a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    /// The inline durable delete succeeded.
    pub durable_cleared: bool,
    /// The inline cache delete succeeded.
    pub cache_cleared: bool,
    /// Background retries handed to the supervisor.
    pub retries_scheduled: usize,
}

/// Per-kind session store over a cache and a durable repository.
#[derive(Debug, Clone)]
pub struct TieredSessionStore<R: SessionRecord> {
    durable: Arc<dyn SessionRepository<R>>,
    cache: CacheManager,
    supervisor: TaskSupervisor,
    delete_attempts: u32,
    delete_backoff: Duration,
}

impl<R: SessionRecord> TieredSessionStore<R> {
    /// Create a store for one token kind.
    pub fn new(
        durable: Arc<dyn SessionRepository<R>>,
        cache: CacheManager,
        supervisor: TaskSupervisor,
        config: &SessionConfig,
    ) -> Self {
        Self {
            durable,
            cache,
            supervisor,
            delete_attempts: config.delete_max_attempts.max(1),
            delete_backoff: Duration::from_millis(config.delete_backoff_ms),
        }
    }

    fn cache_key(user_id: i64) -> String {
        keys::session(R::KIND, user_id)
    }

    /// Store `session`, replacing the owner's previous one.
    pub async fn put(&self, session: &R) -> AppResult<()> {
        let (durable, cached) = tokio::join!(self.durable.upsert(session), self.write_cache(session));

        if let Err(e) = cached {
            warn!(
                kind = %R::KIND,
                user_id = session.user_id(),
                error = %e,
                "Session cache write failed"
            );
        }

        if let Err(e) = durable {
            // The cache must not serve a record the durable tier never stored.
            if let Err(evict) = self.cache.delete(&Self::cache_key(session.user_id())).await {
                warn!(
                    kind = %R::KIND,
                    user_id = session.user_id(),
                    error = %evict,
                    "Could not evict cache entry after durable write failure"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    async fn write_cache(&self, session: &R) -> AppResult<()> {
        let Some(ttl) = session.remaining_ttl(Utc::now()) else {
            debug!(kind = %R::KIND, user_id = session.user_id(), "Session already expired, not caching");
            return Ok(());
        };
        let encoded = codec::encode(session)?;
        self.cache
            .set(&Self::cache_key(session.user_id()), &encoded, ttl)
            .await
    }

    async fn read_cache(&self, user_id: i64) -> Option<R> {
        let key = Self::cache_key(user_id);
        let raw = match self.cache.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(kind = %R::KIND, user_id, error = %e, "Session cache read failed");
                return None;
            }
        };
        match codec::decode::<R>(&raw) {
            Ok(session) if !session.is_expired() => Some(session),
            Ok(_) => None,
            Err(e) => {
                warn!(kind = %R::KIND, user_id, error = %e, "Undecodable session cache entry");
                None
            }
        }
    }

    /// Find the live session holding `token`.
    pub async fn get_by_token(&self, token: &str) -> AppResult<Option<R>> {
        if let Some(owner) = peek_owner(token) {
            if let Some(hit) = self.read_cache(owner).await {
                if hit.token() == token {
                    return Ok(Some(hit));
                }
            }
        }

        let found = self.durable.find_by_token(token).await?;
        Ok(found.filter(|s| !s.is_expired()))
    }

    /// Find the live session owned by `user_id`.
    pub async fn get_by_user_id(&self, user_id: i64) -> AppResult<Option<R>> {
        if let Some(hit) = self.read_cache(user_id).await {
            return Ok(Some(hit));
        }
        let found = self.durable.find_by_user_id(user_id).await?;
        Ok(found.filter(|s| !s.is_expired()))
    }

    /// Remove the owner's session from both tiers.
    ///
    /// Never fails: tiers that could not be cleared inline are retried in
    /// the background, and only for the token that was current at call time.
    pub async fn delete_by_user_id(&self, user_id: i64) -> DeleteOutcome {
        let superseded = match self.get_by_user_id(user_id).await {
            Ok(current) => current.map(|s| s.token().to_string()),
            Err(e) => {
                warn!(kind = %R::KIND, user_id, error = %e, "Could not read session before delete");
                None
            }
        };

        let key = Self::cache_key(user_id);
        let (durable, cached) = tokio::join!(
            self.durable.delete_by_user_id(user_id, superseded.as_deref()),
            self.cache.delete(&key)
        );

        let mut outcome = DeleteOutcome {
            durable_cleared: durable.is_ok(),
            cache_cleared: cached.is_ok(),
            retries_scheduled: 0,
        };

        if let Err(e) = &durable {
            warn!(kind = %R::KIND, user_id, error = %e, "Durable session delete failed");
        }
        if let Err(e) = &cached {
            warn!(kind = %R::KIND, user_id, error = %e, "Cache session delete failed");
        }

        let Some(policy) = self.retry_policy() else {
            return outcome;
        };
        let Some(token) = superseded else {
            if durable.is_err() || cached.is_err() {
                warn!(kind = %R::KIND, user_id, "Superseded token unknown, not retrying delete");
            }
            return outcome;
        };

        if durable.is_err() && self.retry_durable_delete(user_id, token.clone(), policy) {
            outcome.retries_scheduled += 1;
        }
        if cached.is_err() && self.retry_cache_delete(key, token, policy) {
            outcome.retries_scheduled += 1;
        }
        outcome
    }

    /// Replace the owner's session: delete in both tiers, then insert.
    pub async fn rotate(&self, session: &R) -> AppResult<()> {
        self.delete_by_user_id(session.user_id()).await;
        self.put(session).await
    }

    /// Remaining attempts after the inline one, each after a fixed backoff.
    fn retry_policy(&self) -> Option<RetryPolicy> {
        let remaining = self.delete_attempts.checked_sub(1).filter(|n| *n > 0)?;
        Some(RetryPolicy::new(remaining, self.delete_backoff).with_initial_delay(self.delete_backoff))
    }

    fn retry_durable_delete(&self, user_id: i64, token: String, policy: RetryPolicy) -> bool {
        let durable = Arc::clone(&self.durable);
        self.supervisor
            .submit_retrying("session-durable-delete", policy, move || {
                let durable = Arc::clone(&durable);
                let token = token.clone();
                async move {
                    durable
                        .delete_by_user_id(user_id, Some(&token))
                        .await
                        .map(|_| ())
                }
            })
    }

    fn retry_cache_delete(&self, key: String, token: String, policy: RetryPolicy) -> bool {
        let cache = self.cache.clone();
        self.supervisor
            .submit_retrying("session-cache-delete", policy, move || {
                let cache = cache.clone();
                let key = key.clone();
                let token = token.clone();
                async move {
                    match cache.get(&key).await {
                        Ok(Some(raw)) => match codec::decode::<R>(&raw) {
                            Ok(current) if current.token() != token => Ok(()),
                            _ => cache.delete(&key).await,
                        },
                        Ok(None) => Ok(()),
                        Err(e) => Err(e),
                    }
                }
            })
    }
}
