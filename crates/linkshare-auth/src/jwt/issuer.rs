//! Token minting and validation with a separate key per token kind.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use linkshare_core::config::AuthConfig;
use linkshare_core::error::{AppError, ErrorKind};
use linkshare_core::result::AppResult;
use linkshare_entity::session::{TokenKind, UserClaims};

use super::claims::TokenClaims;
use super::error::TokenError;

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// Compact JWS.
    pub token: String,
    /// Equal to the token's `exp` claim.
    pub expires_at: DateTime<Utc>,
}

/// Access and refresh tokens handed to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

struct KindKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

/// Mints and validates HS256 tokens for both kinds.
pub struct TokenIssuer {
    access: KindKeys,
    refresh: KindKeys,
    issuer: String,
    validation: Validation,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Build an issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            access: KindKeys {
                encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
                ttl: Duration::from_secs(config.access_token_ttl_seconds),
            },
            refresh: KindKeys {
                encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
                ttl: Duration::from_secs(config.refresh_token_ttl_seconds),
            },
            issuer: config.issuer.clone(),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &KindKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Configured lifetime of `kind`.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        self.keys(kind).ttl
    }

    /// Mint a token of `kind` with its configured TTL.
    pub fn mint(&self, claims: &UserClaims, kind: TokenKind) -> AppResult<MintedToken> {
        self.mint_with_ttl(claims, kind, self.ttl(kind))
    }

    /// Mint a token of `kind` that expires `ttl` from now.
    pub fn mint_with_ttl(
        &self,
        claims: &UserClaims,
        kind: TokenKind,
        ttl: Duration,
    ) -> AppResult<MintedToken> {
        let iat = Utc::now().timestamp();
        let exp = iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AppError::internal(format!("Token expiry out of range: {exp}")))?;

        let payload = TokenClaims {
            id: claims.id,
            username: claims.username.clone(),
            email: claims.email.clone(),
            exp,
            iat,
            iss: self.issuer.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &self.keys(kind).encoding,
        )
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, format!("Failed to sign {kind} token"), e)
        })?;

        Ok(MintedToken { token, expires_at })
    }

    /// Verify a token of `kind` and return its identity claims.
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<UserClaims, TokenError> {
        Ok(self.decode_claims(token, kind)?.user())
    }

    /// Verify a token of `kind` and return the full payload.
    pub fn decode_claims(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.keys(kind).decoding, &self.validation)?;

        // The library allows exp == now; a token is dead from its exp second on.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}
