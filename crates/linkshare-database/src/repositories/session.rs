//! Session repository implementation, generic over the token kind.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use linkshare_core::error::{AppError, ErrorKind};
use linkshare_core::result::AppResult;
use linkshare_entity::session::{SessionRecord, UserClaims};

use super::SessionRepository;

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    expires_at: DateTime<Utc>,
    claims: Json<UserClaims>,
}

impl SessionRow {
    fn into_record<R: SessionRecord>(self) -> R {
        R::new(self.token, self.expires_at, self.claims.0)
    }
}

/// PostgreSQL-backed session repository. The table is chosen by `R::KIND`.
#[derive(Debug)]
pub struct PgSessionRepository<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R: SessionRecord> PgSessionRepository<R> {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn table(&self) -> &'static str {
        R::KIND.collection()
    }
}

#[async_trait]
impl<R: SessionRecord> SessionRepository<R> for PgSessionRepository<R> {
    async fn upsert(&self, session: &R) -> AppResult<()> {
        let sql = format!(
            "INSERT INTO {} (internal_id, user_id, token, expires_at, claims) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
             token = EXCLUDED.token, expires_at = EXCLUDED.expires_at, claims = EXCLUDED.claims",
            self.table()
        );
        sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(session.user_id())
            .bind(session.token())
            .bind(session.expires_at())
            .bind(Json(session.claims()))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to upsert {} session", R::KIND),
                    e,
                )
            })?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<R>> {
        let sql = format!(
            "SELECT token, expires_at, claims FROM {} WHERE token = $1 AND expires_at > NOW()",
            self.table()
        );
        let row = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to find {} session by token", R::KIND),
                    e,
                )
            })?;
        Ok(row.map(SessionRow::into_record))
    }

    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Option<R>> {
        let sql = format!(
            "SELECT token, expires_at, claims FROM {} WHERE user_id = $1 AND expires_at > NOW()",
            self.table()
        );
        let row = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to find {} session by user", R::KIND),
                    e,
                )
            })?;
        Ok(row.map(SessionRow::into_record))
    }

    async fn delete_by_user_id(&self, user_id: i64, token: Option<&str>) -> AppResult<u64> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND ($2::TEXT IS NULL OR token = $2)",
            self.table()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to delete {} session", R::KIND),
                    e,
                )
            })?;
        Ok(result.rows_affected())
    }
}
