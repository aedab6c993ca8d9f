//! HTTP Basic client gate for login and refresh.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::{Authorization, HeaderMapExt};

use linkshare_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Requires the configured client credentials when the gate is enabled.
pub async fn require_basic_client(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = &state.basic_client;
    if !expected.is_enabled() {
        return Ok(next.run(request).await);
    }

    if !request.headers().contains_key(AUTHORIZATION) {
        return Err(AppError::unauthorized("No Authorization header").into());
    }
    let Some(basic) = request.headers().typed_get::<Authorization<Basic>>() else {
        return Err(AppError::unauthorized("Invalid Authorization header").into());
    };
    if basic.username() != expected.username || basic.password() != expected.password {
        tracing::debug!(client = basic.username(), "Client credentials rejected");
        return Err(AppError::unauthorized("Invalid username or password").into());
    }

    Ok(next.run(request).await)
}
