use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    state::AppState,
};

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Request-scoped identity. Requests without an `Authorization` header get an
/// anonymous session; a header that is present but invalid is rejected.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<AuthUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            user: Some(AuthUser { user_id }),
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }
}

/// Source of the currently signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Option<Uuid>;
}

#[async_trait]
impl IdentityProvider for Session {
    async fn current_user(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.user_id)
    }
}

pub fn issue_token(user_id: Uuid, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(token: &str, secret: &str) -> AppResult<AuthUser> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;
    Ok(AuthUser { user_id })
}

fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Session::anonymous());
        };

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;
        let token = bearer_token(auth_str).ok_or(AppError::Unauthorized)?;
        let user = decode_token(token, &state.jwt_secret)?;

        Ok(Session { user: Some(user) })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        session.user.ok_or(AppError::Unauthorized)
    }
}
