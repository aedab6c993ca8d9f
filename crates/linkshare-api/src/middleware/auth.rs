//! Bearer access-token gate.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Rejects requests without a valid access token and stores the caller's
/// claims in the request extensions.
pub async fn require_access_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = AuthUser::from_headers(request.headers(), &state)?;
    tracing::trace!(user_id = user.id, "Access token accepted");
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
