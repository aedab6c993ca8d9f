//! Integration tests for the refresh protocol and the tiered session store.

mod helpers;

use std::collections::HashSet;
use std::time::Duration;

use axum::http::StatusCode;
use linkshare_cache::codec;
use linkshare_core::traits::CacheProvider;
use linkshare_entity::session::{AccessTokenSession, SessionRecord, TokenKind, UserClaims};

use helpers::{Auth, TestApp};

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let app = TestApp::new();
    let id = app.register("alice", "alice@example.com", "correct").await;
    let (access, refresh) = app.login("alice", "correct").await;

    let response = app.refresh(&refresh).await;
    assert_eq!(response.status, StatusCode::OK);

    let new_access = response.token("access_token");
    assert_ne!(new_access, access);
    assert_eq!(response.token("refresh_token"), refresh);
    assert_eq!(app.auth.verify_access(&new_access).unwrap().id, id);

    // The old access session is gone from both tiers.
    assert_eq!(app.access_rows.raw(id).unwrap().token, new_access);
    let cached = app
        .cache
        .get(&format!("access_token_sessions:{id}"))
        .await
        .unwrap()
        .unwrap();
    let cached: AccessTokenSession = codec::decode(&cached).unwrap();
    assert_eq!(cached.token, new_access);
}

#[tokio::test]
async fn test_repeated_refreshes_never_reuse_access_tokens() {
    let app = TestApp::new();
    app.register("alice", "alice@example.com", "correct").await;
    let (access, refresh) = app.login("alice", "correct").await;

    let mut seen = HashSet::from([access]);
    for _ in 0..3 {
        let response = app.refresh(&refresh).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(seen.insert(response.token("access_token")));
    }
}

#[tokio::test]
async fn test_refresh_with_bearer_header_when_gate_disabled() {
    let mut config = helpers::auth_config();
    config.basic_client = Default::default();
    let app = TestApp::with_auth_config(config);
    app.register("bob", "bob@example.com", "pw").await;
    let (_, refresh) = app.login("bob", "pw").await;

    let response = app
        .request("POST", "/auth/refresh-token", None, Auth::Bearer(&refresh))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.token("refresh_token"), refresh);
}

#[tokio::test]
async fn test_refresh_without_session_is_expired() {
    let app = TestApp::new();
    let id = app.register("carol", "carol@example.com", "pw").await;

    // Authentic refresh token that was never stored.
    let claims = UserClaims {
        id,
        username: "carol".to_string(),
        email: "carol@example.com".to_string(),
    };
    let orphan = app.auth.issuer().mint(&claims, TokenKind::Refresh).unwrap();

    let response = app.refresh(&orphan.token).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_message(), "refresh token expired");
    assert!(app.access_rows.is_empty());
}

#[tokio::test]
async fn test_refresh_with_expired_token_is_expired() {
    let app = TestApp::new();
    let id = app.register("dave", "dave@example.com", "pw").await;
    let claims = UserClaims {
        id,
        username: "dave".to_string(),
        email: "dave@example.com".to_string(),
    };
    let expired = app
        .auth
        .issuer()
        .mint_with_ttl(&claims, TokenKind::Refresh, Duration::ZERO)
        .unwrap();

    let response = app.refresh(&expired.token).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_message(), "refresh token expired");
}

#[tokio::test]
async fn test_superseded_refresh_token_is_rejected() {
    let app = TestApp::new();
    app.register("erin", "erin@example.com", "pw").await;
    let (_, first_refresh) = app.login("erin", "pw").await;
    let (_, second_refresh) = app.login("erin", "pw").await;

    // The second login replaced the owner's refresh session.
    let stale = app.refresh(&first_refresh).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
    assert_eq!(stale.error_message(), "refresh token expired");

    assert_eq!(app.refresh(&second_refresh).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_access_token_cannot_refresh() {
    let app = TestApp::new();
    app.register("frank", "frank@example.com", "pw").await;
    let (access, _) = app.login("frank", "pw").await;

    let response = app.refresh(&access).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_message(), "invalid refresh token");
}

#[tokio::test]
async fn test_refresh_requires_client_credentials() {
    let app = TestApp::new();
    app.register("grace", "grace@example.com", "pw").await;
    let (_, refresh) = app.login("grace", "pw").await;

    let response = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(serde_json::json!({ "refresh_token": refresh })),
            Auth::WrongClient,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_without_token_is_rejected() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/auth/refresh-token", None, Auth::Client)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_message(), "invalid refresh token");
}

#[tokio::test]
async fn test_concurrent_refreshes_are_last_writer_wins() {
    let app = TestApp::new();
    let id = app.register("heidi", "heidi@example.com", "pw").await;
    let (_, refresh) = app.login("heidi", "pw").await;

    let (a, b) = tokio::join!(app.auth.refresh(&refresh), app.auth.refresh(&refresh));
    let issued: HashSet<String> = [a.unwrap().access_token, b.unwrap().access_token].into();
    assert_eq!(issued.len(), 2);

    let current = app.auth.access_session(id).await.unwrap().unwrap();
    assert!(issued.contains(&current.token));

    // Token and expiry always come from the same mint.
    let decoded = app
        .auth
        .issuer()
        .decode_claims(&current.token, TokenKind::Access)
        .unwrap();
    assert_eq!(decoded.expires_at(), Some(current.expires_at));
    assert_eq!(current.user_id(), id);

    let durable = app.access_rows.raw(id).unwrap();
    assert!(issued.contains(&durable.token));
    assert_eq!(app.access_rows.len(), 1);

    // Both tiers settle on the same record.
    let raw = app
        .cache
        .get(&format!("access_token_sessions:{id}"))
        .await
        .unwrap()
        .unwrap();
    let cached: AccessTokenSession = codec::decode(&raw).unwrap();
    assert_eq!(cached.token, durable.token);
    assert_eq!(cached.expires_at, durable.expires_at);

    assert!(app.supervisor.shutdown(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_login_survives_cache_eviction() {
    let app = TestApp::new();
    let id = app.register("ivan", "ivan@example.com", "pw").await;
    let (_, refresh) = app.login("ivan", "pw").await;

    app.cache
        .delete(&format!("refresh_token_sessions:{id}"))
        .await
        .unwrap();

    // The durable tier still answers.
    assert_eq!(app.refresh(&refresh).await.status, StatusCode::OK);
}
