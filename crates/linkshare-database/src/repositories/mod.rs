//! Repository traits and their PostgreSQL implementations.
//!
//! The auth layer only sees the traits; the server wires in the PostgreSQL
//! implementations and tests wire in [`crate::memory`].

pub mod credential;
pub mod session;

use async_trait::async_trait;

use linkshare_core::result::AppResult;
use linkshare_entity::credential::{Credential, NewCredential};
use linkshare_entity::session::SessionRecord;

pub use credential::PgCredentialRepository;
pub use session::PgSessionRepository;

/// Read access to credentials plus transactional inserts.
#[async_trait]
pub trait CredentialRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Exact-match lookup by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Credential>>;

    /// Exact-match lookup by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>>;

    /// Open a unit of work for inserting credentials.
    async fn begin(&self) -> AppResult<Box<dyn CredentialTransaction>>;
}

/// An open unit of work. Dropping it without committing discards its writes.
#[async_trait]
pub trait CredentialTransaction: Send {
    /// Insert a credential. A duplicate username or email yields
    /// [`linkshare_core::error::ErrorKind::Conflict`].
    async fn insert(&mut self, credential: &NewCredential) -> AppResult<Credential>;

    /// Make the inserts durable.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard the inserts.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Durable tier of a per-kind session store.
///
/// Rows are keyed by owning user id; tokens are unique within a kind. Reads
/// never return records whose expiry has passed.
#[async_trait]
pub trait SessionRepository<R: SessionRecord>: Send + Sync + std::fmt::Debug + 'static {
    /// Insert the record, replacing any existing row for the same user.
    async fn upsert(&self, session: &R) -> AppResult<()>;

    /// Find a live record by its token string.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<R>>;

    /// Find the live record owned by `user_id`.
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Option<R>>;

    /// Delete the user's row. When `token` is given only a row still holding
    /// that token is removed. Returns the number of rows deleted.
    async fn delete_by_user_id(&self, user_id: i64, token: Option<&str>) -> AppResult<u64>;
}
