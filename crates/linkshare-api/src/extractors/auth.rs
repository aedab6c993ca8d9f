//! `AuthUser` extractor: the claims of a validated bearer access token.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use linkshare_core::error::AppError;
use linkshare_entity::session::UserClaims;

use crate::error::ApiError;
use crate::state::AppState;

/// Identity of the caller, taken from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub UserClaims);

impl std::ops::Deref for AuthUser {
    type Target = UserClaims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Token from an `Authorization: Bearer` header, if one is present.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|token| !token.is_empty())
}

impl AuthUser {
    /// Validate the bearer access token in `headers`.
    pub fn from_headers(headers: &HeaderMap, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(headers).ok_or_else(|| AppError::unauthorized("invalid token"))?;
        let claims = state.auth.verify_access(&token)?;
        Ok(Self(claims))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by the bearer gate when the route is behind it.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        Ok(Self::from_headers(&parts.headers, state)?)
    }
}
