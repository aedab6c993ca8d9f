//! Refresh-token exchange.
//!
//! The refresh token's signature and its stored session are checked
//! concurrently. A bad signature wins over any lookup result and cancels the
//! lookup; the lookup itself is bounded by a timeout. Once both pass, a new
//! access token is minted from the stored claims and the owner's access
//! session is rotated.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use linkshare_core::config::SessionConfig;
use linkshare_core::error::AppError;
use linkshare_core::result::AppResult;
use linkshare_entity::session::{
    AccessTokenSession, RefreshTokenSession, SessionRecord, TokenKind,
};

use crate::jwt::{TokenError, TokenIssuer, TokenPair};

use super::store::TieredSessionStore;

/// Client-facing text for a forged or unreadable refresh token.
pub const INVALID_REFRESH_TOKEN: &str = "invalid refresh token";
/// Client-facing text for an expired or revoked refresh token.
pub const REFRESH_TOKEN_EXPIRED: &str = "refresh token expired";

/// Progress of one refresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// Signature check and session lookup in flight.
    Verifying,
    /// Minting and storing the new access session.
    Rotating,
    /// New access token issued.
    Done,
    /// Refused.
    Rejected,
}

impl fmt::Display for RefreshPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Verifying => "verifying",
            Self::Rotating => "rotating",
            Self::Done => "done",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

enum Lookup {
    Found(Option<RefreshTokenSession>),
    Failed(AppError),
    TimedOut,
    Cancelled,
}

/// Coordinates refresh-token validation and access-session rotation.
#[derive(Debug, Clone)]
pub struct RefreshCoordinator {
    issuer: Arc<TokenIssuer>,
    refresh_sessions: TieredSessionStore<RefreshTokenSession>,
    access_sessions: TieredSessionStore<AccessTokenSession>,
    fetch_timeout: Duration,
}

impl RefreshCoordinator {
    /// Create a coordinator.
    pub fn new(
        issuer: Arc<TokenIssuer>,
        refresh_sessions: TieredSessionStore<RefreshTokenSession>,
        access_sessions: TieredSessionStore<AccessTokenSession>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            issuer,
            refresh_sessions,
            access_sessions,
            fetch_timeout: Duration::from_millis(config.refresh_fetch_timeout_ms),
        }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The returned pair carries the presented refresh token unchanged.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let cancel = CancellationToken::new();
        // Cancels the lookup on every early return.
        let _cancel_on_exit = cancel.clone().drop_guard();

        let lookup = {
            let store = self.refresh_sessions.clone();
            let token = refresh_token.to_string();
            let cancel = cancel.clone();
            let timeout = self.fetch_timeout;
            tokio::spawn(async move {
                tokio::select! {
                    () = cancel.cancelled() => Lookup::Cancelled,
                    res = tokio::time::timeout(timeout, store.get_by_token(&token)) => match res {
                        Ok(Ok(found)) => Lookup::Found(found),
                        Ok(Err(e)) => Lookup::Failed(e),
                        Err(_) => Lookup::TimedOut,
                    },
                }
            })
        };

        debug!(phase = %RefreshPhase::Verifying, "Refresh started");
        let verified = self.issuer.validate(refresh_token, TokenKind::Refresh);

        let claims = match verified {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                cancel.cancel();
                return Err(reject(REFRESH_TOKEN_EXPIRED, "signature valid, token expired"));
            }
            Err(e) => {
                cancel.cancel();
                return Err(reject(INVALID_REFRESH_TOKEN, &e.to_string()));
            }
        };

        let outcome = lookup
            .await
            .map_err(|e| AppError::internal(format!("Refresh session lookup task failed: {e}")))?;

        let session = match outcome {
            Lookup::Found(Some(session)) if !session.is_expired() => session,
            Lookup::Found(_) => {
                info!(
                    phase = %RefreshPhase::Rejected,
                    user_id = claims.id,
                    "Authentic refresh token without a live session (revoked or expired)"
                );
                return Err(AppError::unauthorized(REFRESH_TOKEN_EXPIRED));
            }
            Lookup::Failed(e) => {
                debug!(phase = %RefreshPhase::Rejected, error = %e, "Refresh session lookup failed");
                return Err(e);
            }
            Lookup::TimedOut => {
                debug!(phase = %RefreshPhase::Rejected, "Refresh session lookup timed out");
                return Err(AppError::internal(format!(
                    "Refresh session lookup exceeded {} ms",
                    self.fetch_timeout.as_millis()
                )));
            }
            Lookup::Cancelled => {
                return Err(AppError::internal("Refresh session lookup was cancelled"));
            }
        };

        debug!(phase = %RefreshPhase::Rotating, user_id = session.user_id(), "Rotating access session");
        let minted = self.issuer.mint(session.claims(), TokenKind::Access)?;
        let access = AccessTokenSession::new(
            minted.token.clone(),
            minted.expires_at,
            session.claims().clone(),
        );
        self.access_sessions.rotate(&access).await?;

        info!(phase = %RefreshPhase::Done, user_id = session.user_id(), "Access token refreshed");
        Ok(TokenPair {
            access_token: minted.token,
            refresh_token: refresh_token.to_string(),
        })
    }
}

fn reject(public: &'static str, reason: &str) -> AppError {
    info!(phase = %RefreshPhase::Rejected, reason, "Refresh token rejected");
    AppError::unauthorized(public)
}
