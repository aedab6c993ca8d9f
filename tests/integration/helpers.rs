//! Shared test helpers for integration tests.
//!
//! The app is wired against the in-memory repositories and the moka cache so
//! the suite runs without PostgreSQL or Redis.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower::ServiceExt;

use linkshare_api::{AppState, build_app};
use linkshare_auth::{AuthBackends, AuthService};
use linkshare_cache::CacheManager;
use linkshare_cache::memory::MemoryCacheProvider;
use linkshare_core::config::cache::MemoryCacheConfig;
use linkshare_core::config::{
    AuthConfig, BasicClientConfig, PasswordHashConfig, SessionConfig, WorkerConfig,
};
use linkshare_database::memory::{MemoryCredentialRepository, MemorySessionRepository};
use linkshare_entity::session::{AccessTokenSession, RefreshTokenSession};
use linkshare_worker::TaskSupervisor;

/// Client credentials the Basic gate expects.
pub const CLIENT_USERNAME: &str = "mobile-app";
/// Client password the Basic gate expects.
pub const CLIENT_PASSWORD: &str = "client-secret";

/// How a test request authenticates.
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
    /// No `Authorization` header.
    None,
    /// The configured Basic client credentials.
    Client,
    /// Basic credentials that do not match.
    WrongClient,
    /// `Authorization: Bearer <token>`.
    Bearer(&'a str),
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Service behind the router
    pub auth: Arc<AuthService>,
    /// Credential rows
    pub credentials: MemoryCredentialRepository,
    /// Durable access sessions
    pub access_rows: MemorySessionRepository<AccessTokenSession>,
    /// Durable refresh sessions
    pub refresh_rows: MemorySessionRepository<RefreshTokenSession>,
    /// Shared cache
    pub cache: CacheManager,
    /// Background task owner
    pub supervisor: TaskSupervisor,
}

impl TestApp {
    /// Create a new test application with the client gate enabled
    pub fn new() -> Self {
        Self::with_auth_config(auth_config())
    }

    /// Create a test application from a custom auth configuration
    pub fn with_auth_config(auth: AuthConfig) -> Self {
        let credentials = MemoryCredentialRepository::new();
        let access_rows = MemorySessionRepository::new();
        let refresh_rows = MemorySessionRepository::new();
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig::default(),
        )));
        let supervisor = TaskSupervisor::new(&WorkerConfig::default());

        let service = AuthService::new(
            &auth,
            &SessionConfig {
                refresh_fetch_timeout_ms: 3_000,
                delete_max_attempts: 3,
                delete_backoff_ms: 10,
            },
            AuthBackends {
                credentials: Arc::new(credentials.clone()),
                access_sessions: Arc::new(access_rows.clone()),
                refresh_sessions: Arc::new(refresh_rows.clone()),
                cache: cache.clone(),
                supervisor: supervisor.clone(),
            },
        )
        .expect("Failed to build auth service");

        let state = AppState::new(service, auth.basic_client.clone());
        let auth = Arc::clone(&state.auth);

        Self {
            router: build_app(state),
            auth,
            credentials,
            access_rows,
            refresh_rows,
            cache,
            supervisor,
        }
    }

    /// Register a user through the API and return their id
    pub async fn register(&self, username: &str, email: &str, password: &str) -> i64 {
        let response = self
            .request(
                "POST",
                "/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                })),
                Auth::None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        response.body["data"]["id"]
            .as_i64()
            .expect("No id in register response")
    }

    /// Login and return `(access_token, refresh_token)`
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/auth/login",
                Some(serde_json::json!({
                    "username": username,
                    "password": password,
                })),
                Auth::Client,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        (
            response.token("access_token"),
            response.token("refresh_token"),
        )
    }

    /// Refresh through the API with the token in the JSON body
    pub async fn refresh(&self, refresh_token: &str) -> TestResponse {
        self.request(
            "POST",
            "/auth/refresh-token",
            Some(serde_json::json!({ "refresh_token": refresh_token })),
            Auth::Client,
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        auth: Auth<'_>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        req = match auth {
            Auth::None => req,
            Auth::Client => req.header("Authorization", basic(CLIENT_USERNAME, CLIENT_PASSWORD)),
            Auth::WrongClient => req.header("Authorization", basic(CLIENT_USERNAME, "nope")),
            Auth::Bearer(token) => req.header("Authorization", format!("Bearer {token}")),
        };

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Auth configuration used by the suite: cheap Argon2 cost, gate enabled.
pub fn auth_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "integration-access-secret".to_string(),
        refresh_token_secret: "integration-refresh-secret".to_string(),
        access_token_ttl_seconds: 60,
        refresh_token_ttl_seconds: 600,
        issuer: "linkshare".to_string(),
        password: PasswordHashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
        basic_client: BasicClientConfig {
            username: CLIENT_USERNAME.to_string(),
            password: CLIENT_PASSWORD.to_string(),
        },
    }
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// String field under `data`
    pub fn token(&self, field: &str) -> String {
        self.body["data"][field]
            .as_str()
            .unwrap_or_else(|| panic!("No {field} in response: {:?}", self.body))
            .to_string()
    }

    /// `error.message` of a failure envelope
    pub fn error_message(&self) -> &str {
        self.body["error"]["message"].as_str().unwrap_or_default()
    }
}
