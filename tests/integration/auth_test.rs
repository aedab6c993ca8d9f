//! Integration tests for registration, login and the request gates.

mod helpers;

use axum::http::StatusCode;
use linkshare_entity::session::TokenKind;

use helpers::{Auth, TestApp};

#[tokio::test]
async fn test_ping() {
    let app = TestApp::new();
    let response = app.request("GET", "/ping", None, Auth::None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status_message"], "success");
    assert_eq!(response.body["data"]["ping"], "pong");
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let id = app.register("alice", "alice@example.com", "correct").await;

    let (access, refresh) = app.login("alice", "correct").await;
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
    assert_ne!(access, refresh);

    let claims = app.auth.verify_access(&access).unwrap();
    assert_eq!(claims.id, id);
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.email, "alice@example.com");

    let refresh_claims = app
        .auth
        .issuer()
        .validate(&refresh, TokenKind::Refresh)
        .unwrap();
    assert_eq!(refresh_claims, claims);

    assert_eq!(app.access_rows.raw(id).unwrap().token, access);
    assert_eq!(app.refresh_rows.raw(id).unwrap().token, refresh);
}

#[tokio::test]
async fn test_login_by_email() {
    let app = TestApp::new();
    app.register("bob", "bob@example.com", "hunter2").await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "bob@example.com",
                "password": "hunter2",
            })),
            Auth::Client,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.token("access_token").is_empty());
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new();
    app.register("alice", "alice@example.com", "correct").await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "username": "alice",
                "password": "wrong",
            })),
            Auth::Client,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["status_message"], "error");
    assert!(response.body["data"].is_null());
    assert_eq!(
        response.error_message(),
        "username or email or password is not valid"
    );
    assert!(app.access_rows.is_empty());
    assert!(app.refresh_rows.is_empty());
}

#[tokio::test]
async fn test_login_nonexistent_user_matches_wrong_password() {
    let app = TestApp::new();
    app.register("alice", "alice@example.com", "correct").await;

    let unknown = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "username": "nobody",
                "password": "correct",
            })),
            Auth::Client,
        )
        .await;
    let wrong = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "username": "alice",
                "password": "wrong",
            })),
            Auth::Client,
        )
        .await;

    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body, wrong.body);
}

#[tokio::test]
async fn test_login_without_identifier_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "password": "x" })),
            Auth::Client,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_requires_client_credentials() {
    let app = TestApp::new();
    app.register("alice", "alice@example.com", "correct").await;
    let body = serde_json::json!({ "username": "alice", "password": "correct" });

    let missing = app
        .request("POST", "/auth/login", Some(body.clone()), Auth::None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error_message(), "No Authorization header");

    let wrong = app
        .request("POST", "/auth/login", Some(body), Auth::WrongClient)
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.error_message(), "Invalid username or password");
    assert!(app.access_rows.is_empty());
}

#[tokio::test]
async fn test_disabled_client_gate_lets_login_through() {
    let mut config = helpers::auth_config();
    config.basic_client = Default::default();
    let app = TestApp::with_auth_config(config);
    app.register("carol", "carol@example.com", "pw").await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "username": "carol", "password": "pw" })),
            Auth::None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let app = TestApp::new();
    let body = serde_json::json!({
        "username": "alice",
        "email": "alice@x.com",
        "password": "pw",
    });

    let first = app
        .request("POST", "/auth/register", Some(body.clone()), Auth::None)
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["data"]["username"], "alice");
    assert!(first.body["data"].get("password_hash").is_none());

    let second = app
        .request("POST", "/auth/register", Some(body), Auth::None)
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_message(), "username or email already taken");
    assert_eq!(app.credentials.len(), 1);
}

#[tokio::test]
async fn test_register_same_email_conflicts() {
    let app = TestApp::new();
    app.register("alice", "shared@example.com", "pw").await;

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(serde_json::json!({
                "username": "alice2",
                "email": "shared@example.com",
                "password": "pw",
            })),
            Auth::None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(app.credentials.len(), 1);
}

#[tokio::test]
async fn test_register_blank_fields_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(serde_json::json!({
                "username": "   ",
                "email": "a@b.c",
                "password": "pw",
            })),
            Auth::None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.credentials.is_empty());
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(serde_json::json!(["not", "an", "object"])),
            Auth::None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status_message"], "error");
    assert_eq!(response.body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn test_verify_token_accepts_access_token() {
    let app = TestApp::new();
    let id = app.register("dave", "dave@example.com", "pw").await;
    let (access, _) = app.login("dave", "pw").await;

    let response = app
        .request("GET", "/auth/verify-token", None, Auth::Bearer(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], id);
    assert_eq!(response.body["data"]["username"], "dave");
}

#[tokio::test]
async fn test_verify_token_rejects_refresh_and_garbage() {
    let app = TestApp::new();
    app.register("erin", "erin@example.com", "pw").await;
    let (_, refresh) = app.login("erin", "pw").await;

    for auth in [Auth::Bearer(&refresh), Auth::Bearer("garbage"), Auth::None] {
        let response = app.request("GET", "/auth/verify-token", None, auth).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_message(), "invalid token");
    }
}

#[tokio::test]
async fn test_verify_token_reports_expiry() {
    let app = TestApp::new();
    let id = app.register("frank", "frank@example.com", "pw").await;
    let claims = linkshare_entity::session::UserClaims {
        id,
        username: "frank".to_string(),
        email: "frank@example.com".to_string(),
    };
    let expired = app
        .auth
        .issuer()
        .mint_with_ttl(&claims, TokenKind::Access, std::time::Duration::ZERO)
        .unwrap();

    let response = app
        .request("GET", "/auth/verify-token", None, Auth::Bearer(&expired.token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_message(), "token expired");
}
