//! LinkShare Server: authentication and session management.
//!
//! Main entry point that wires all crates together and starts the server.

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use linkshare_api::{AppState, build_app};
use linkshare_auth::{AuthBackends, AuthService};
use linkshare_cache::CacheManager;
use linkshare_core::config::AppConfig;
use linkshare_database::DatabasePool;
use linkshare_entity::session::{AccessTokenSession, RefreshTokenSession};
use linkshare_worker::TaskSupervisor;

#[tokio::main]
async fn main() {
    let env = std::env::var("LINKSHARE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = ?e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting LinkShare v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database)
        .await
        .context("Database connection failed")?;
    linkshare_database::migration::run_migrations(db.pool())
        .await
        .context("Migration failed")?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Cache ────────────────────────────────────────────
    let cache = CacheManager::new(&config.cache)
        .await
        .context("Cache init failed")?;
    tracing::info!(provider = %config.cache.provider, "Cache initialized");

    // ── Step 3: Background task supervisor ───────────────────────
    let supervisor = TaskSupervisor::new(&config.worker);

    // ── Step 4: Auth service ─────────────────────────────────────
    let auth = AuthService::new(
        &config.auth,
        &config.session,
        AuthBackends {
            credentials: db.credentials(),
            access_sessions: db.sessions::<AccessTokenSession>(),
            refresh_sessions: db.sessions::<RefreshTokenSession>(),
            cache,
            supervisor: supervisor.clone(),
        },
    )
    .context("Auth service init failed")?;

    if !config.auth.basic_client.is_enabled() {
        tracing::warn!("Basic client gate disabled: login and refresh accept any client");
    }

    // ── Step 5: HTTP server ──────────────────────────────────────
    let app = build_app(AppState::new(auth, config.auth.basic_client.clone()));
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(addr = %addr, "LinkShare server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // ── Step 6: Drain background work ────────────────────────────
    tracing::info!(pending = supervisor.pending(), "Draining background tasks");
    let drained = supervisor
        .shutdown(Duration::from_secs(config.worker.drain_timeout_seconds))
        .await;
    if !drained {
        tracing::warn!("Background tasks cancelled before completion");
    }

    db.close().await;
    tracing::info!("LinkShare server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
