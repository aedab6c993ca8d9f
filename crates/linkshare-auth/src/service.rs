//! Authentication use cases consumed by the HTTP layer.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use linkshare_cache::CacheManager;
use linkshare_core::config::{AuthConfig, SessionConfig};
use linkshare_core::error::AppError;
use linkshare_core::result::AppResult;
use linkshare_database::{CredentialRepository, SessionRepository};
use linkshare_entity::credential::Credential;
use linkshare_entity::session::{
    AccessTokenSession, RefreshTokenSession, SessionRecord, TokenKind, UserClaims,
};
use linkshare_worker::TaskSupervisor;

use crate::credential::{CredentialVerifier, TransactionalRegistrar};
use crate::jwt::{TokenIssuer, TokenPair};
use crate::password::PasswordHasher;
use crate::session::{RefreshCoordinator, TieredSessionStore};

/// Tokens returned by login and refresh.
pub type LoginResponse = TokenPair;

/// Login payload. Either `username` or `email` identifies the account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Account username.
    pub username: String,
    /// Account email, used when `username` is empty.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Storage and background-work handles the service is built on.
#[derive(Debug, Clone)]
pub struct AuthBackends {
    /// Credential table.
    pub credentials: Arc<dyn CredentialRepository>,
    /// Durable access sessions.
    pub access_sessions: Arc<dyn SessionRepository<AccessTokenSession>>,
    /// Durable refresh sessions.
    pub refresh_sessions: Arc<dyn SessionRepository<RefreshTokenSession>>,
    /// Volatile tier shared by both session kinds.
    pub cache: CacheManager,
    /// Owner of detached retries.
    pub supervisor: TaskSupervisor,
}

/// Login, refresh, registration and access-token checks.
#[derive(Debug, Clone)]
pub struct AuthService {
    issuer: Arc<TokenIssuer>,
    verifier: CredentialVerifier,
    registrar: TransactionalRegistrar,
    access_sessions: TieredSessionStore<AccessTokenSession>,
    refresh_sessions: TieredSessionStore<RefreshTokenSession>,
    coordinator: RefreshCoordinator,
}

impl AuthService {
    /// Wire the service from configuration and backends.
    pub fn new(
        auth: &AuthConfig,
        session: &SessionConfig,
        backends: AuthBackends,
    ) -> AppResult<Self> {
        let issuer = Arc::new(TokenIssuer::new(auth));
        let hasher = Arc::new(PasswordHasher::new(&auth.password)?);

        let access_sessions = TieredSessionStore::new(
            backends.access_sessions,
            backends.cache.clone(),
            backends.supervisor.clone(),
            session,
        );
        let refresh_sessions = TieredSessionStore::new(
            backends.refresh_sessions,
            backends.cache,
            backends.supervisor,
            session,
        );
        let coordinator = RefreshCoordinator::new(
            Arc::clone(&issuer),
            refresh_sessions.clone(),
            access_sessions.clone(),
            session,
        );

        Ok(Self {
            issuer,
            verifier: CredentialVerifier::new(Arc::clone(&backends.credentials), Arc::clone(&hasher)),
            registrar: TransactionalRegistrar::new(backends.credentials, hasher),
            access_sessions,
            refresh_sessions,
            coordinator,
        })
    }

    /// Verify credentials, mint both tokens and persist both sessions.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let claims = self
            .verifier
            .verify(&request.username, &request.email, &request.password)
            .await?;

        let access = self.issuer.mint(&claims, TokenKind::Access)?;
        let refresh = self.issuer.mint(&claims, TokenKind::Refresh)?;

        let access_session =
            AccessTokenSession::new(access.token.clone(), access.expires_at, claims.clone());
        let refresh_session =
            RefreshTokenSession::new(refresh.token.clone(), refresh.expires_at, claims.clone());

        let (stored_access, stored_refresh) = tokio::join!(
            self.access_sessions.put(&access_session),
            self.refresh_sessions.put(&refresh_session)
        );
        stored_access?;
        stored_refresh?;

        info!(user_id = claims.id, "User logged in");
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<LoginResponse> {
        self.coordinator.refresh(refresh_token).await
    }

    /// Create a member account.
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<Credential> {
        self.registrar
            .register(&request.username, &request.email, &request.password)
            .await
    }

    /// Validate an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> AppResult<UserClaims> {
        self.issuer
            .validate(token, TokenKind::Access)
            .map_err(AppError::from)
    }

    /// The owner's live access session, if any.
    pub async fn access_session(&self, user_id: i64) -> AppResult<Option<AccessTokenSession>> {
        self.access_sessions.get_by_user_id(user_id).await
    }

    /// The owner's live refresh session, if any.
    pub async fn refresh_session(&self, user_id: i64) -> AppResult<Option<RefreshTokenSession>> {
        self.refresh_sessions.get_by_user_id(user_id).await
    }

    /// Token issuer in use.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }
}
