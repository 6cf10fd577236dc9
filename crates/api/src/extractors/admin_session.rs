//! Admin session extractors.
//!
//! Reads use [`AdminSession`]: a valid bearer token whose role may manage
//! badges. Writes use [`AdminWrite`], which additionally requires the
//! anti-forgery nonce bound to that session.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::crypto::verify_session_nonce;
use shared::jwt::{extract_user_id, JwtError, SessionRole};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Header carrying the anti-forgery nonce on admin writes.
pub const NONCE_HEADER: &str = "X-TB-Nonce";

/// Authenticated administrator.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user_id: Uuid,
    /// Session id (`jti`); the nonce is derived from it.
    pub session_id: String,
    pub role: SessionRole,
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("You are not currently logged in.".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AdminSession>() {
            return Ok(session.clone());
        }

        let token = bearer_token(parts)?;
        let claims = state.jwt.validate_token(token).map_err(|e| match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Session has expired".to_string()),
            _ => ApiError::Unauthorized("Invalid session token".to_string()),
        })?;

        if !claims.role.can_manage_badges() {
            tracing::warn!(sub = %claims.sub, role = ?claims.role, "Badge settings access denied");
            return Err(ApiError::Forbidden(
                "Sorry, you are not allowed to manage trust badges.".to_string(),
            ));
        }

        let user_id = extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid session token".to_string()))?;

        let session = AdminSession {
            user_id,
            session_id: claims.jti,
            role: claims.role,
        };
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

/// Administrator whose request carries a valid anti-forgery nonce.
#[derive(Debug, Clone)]
pub struct AdminWrite(pub AdminSession);

#[async_trait]
impl FromRequestParts<AppState> for AdminWrite {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AdminSession::from_request_parts(parts, state).await?;

        let nonce = parts
            .headers
            .get(NONCE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidNonce)?;

        if !verify_session_nonce(&state.config.security.nonce_secret, &session.session_id, nonce)
        {
            tracing::warn!(user_id = %session.user_id, "Rejected write with invalid nonce");
            return Err(ApiError::InvalidNonce);
        }

        Ok(AdminWrite(session))
    }
}
