//! JWT Token Service
//!
//! Issues and verifies the signed credentials used by the authentication
//! gate. Two credential kinds exist, signed with distinct secrets:
//!
//! - **access** — short-lived, sent as `Authorization: Bearer <token>`
//! - **refresh** — long-lived, exchanged for a fresh access token only
//!   (the refresh credential itself is never rotated)
//!
//! The signing algorithm is pinned to HS256; a token whose header names
//! any other algorithm is rejected outright, it is never "verified anyway".

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::models::User;

/// Access token lifetime
const ACCESS_TTL_MINUTES: i64 = 15;
/// Refresh token lifetime
const REFRESH_TTL_HOURS: i64 = 24;

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret for access tokens (should be at least 32 bytes)
    pub access_secret: String,
    /// Secret for refresh tokens, distinct from the access secret
    pub refresh_secret: String,
}

impl TokenConfig {
    /// Load secrets from `ACCESS_SECRET_KEY` / `REFRESH_SECRET_KEY`
    ///
    /// Falls back to development-only defaults with a warning when unset.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("ACCESS_SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("ACCESS_SECRET_KEY not set, using development default");
            "development-access-secret-must-be-replaced".to_string()
        });
        let refresh_secret = std::env::var("REFRESH_SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("REFRESH_SECRET_KEY not set, using development default");
            "development-refresh-secret-must-be-replaced".to_string()
        });

        Self {
            access_secret,
            refresh_secret,
        }
    }
}

/// Claims stored in a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (subject)
    pub sub: String,
    /// Username
    pub username: String,
    /// Role name
    pub role: String,
    /// Token kind: "access" | "refresh"
    pub token_type: String,
    /// Expiry timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
}

/// Token errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token expired")]
    Expired,

    #[error("Token generation failed: {0}")]
    Generation(String),
}

/// Authenticated user context, produced by token verification
///
/// Claims are parsed into typed fields here; nothing downstream touches
/// the raw credential payload.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, TokenError> {
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid("Malformed subject claim".to_string()))?;

        Ok(Self {
            user_id,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// JWT token service
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        }
    }

    /// Mint a short-lived access token for a user
    pub fn issue_access(&self, user: &User) -> Result<String, TokenError> {
        self.issue(
            user,
            "access",
            Duration::minutes(ACCESS_TTL_MINUTES),
            &self.access_encoding,
        )
    }

    /// Mint a long-lived refresh token for a user
    pub fn issue_refresh(&self, user: &User) -> Result<String, TokenError> {
        self.issue(
            user,
            "refresh",
            Duration::hours(REFRESH_TTL_HOURS),
            &self.refresh_encoding,
        )
    }

    /// Verify an access token and produce the typed user context
    pub fn verify_access(&self, token: &str) -> Result<CurrentUser, TokenError> {
        self.verify(token, &self.access_decoding, "access")
    }

    /// Verify a refresh token and produce the typed user context
    pub fn verify_refresh(&self, token: &str) -> Result<CurrentUser, TokenError> {
        self.verify(token, &self.refresh_decoding, "refresh")
    }

    /// Extract a bearer token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    fn issue(
        &self,
        user: &User,
        token_type: &str,
        ttl: Duration,
        key: &EncodingKey,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            token_type: token_type.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    fn verify(
        &self,
        token: &str,
        key: &DecodingKey,
        expected_type: &str,
    ) -> Result<CurrentUser, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        let token_data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::Invalid("Invalid signature".to_string()),
            ErrorKind::InvalidAlgorithm => {
                TokenError::Invalid("Unexpected signing algorithm".to_string())
            }
            _ => TokenError::Invalid(format!("Token validation failed: {e}")),
        })?;

        if token_data.claims.token_type != expected_type {
            return Err(TokenError::Invalid(format!(
                "Expected {expected_type} token"
            )));
        }

        CurrentUser::try_from(token_data.claims)
    }
}
