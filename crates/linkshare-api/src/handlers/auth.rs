//! Auth handlers: register, login, refresh-token, verify-token.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use linkshare_auth::TokenPair;
use linkshare_core::error::AppError;
use linkshare_entity::session::UserClaims;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, RegisterResponse};
use crate::error::ApiError;
use crate::extractors::auth::bearer_token;
use crate::extractors::{ApiJson, AuthUser};
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let created = state.auth.register(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RegisterResponse::from(created))),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let tokens = state.auth.login(&req).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// POST /auth/refresh-token
///
/// The refresh token is read from an `Authorization: Bearer` header, or from
/// a `{"refresh_token": ..}` body when the header carries client credentials.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => refresh_token_from_body(&body)?,
    };
    let tokens = state.auth.refresh(&token).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

fn refresh_token_from_body(body: &[u8]) -> Result<String, AppError> {
    if body.is_empty() {
        return Err(AppError::unauthorized("invalid refresh token"));
    }
    let req: RefreshRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid refresh request body: {e}")))?;
    let token = req.refresh_token.trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("invalid refresh token"));
    }
    Ok(token.to_string())
}

/// GET /auth/verify-token
pub async fn verify_token(user: AuthUser) -> Json<ApiResponse<UserClaims>> {
    Json(ApiResponse::ok(user.0))
}
