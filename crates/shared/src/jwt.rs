//! Admin session tokens using HS256 JWTs.
//!
//! The admin UI authenticates with a bearer token whose claims carry the
//! session role. The token id (`jti`) doubles as the session id that the
//! anti-forgery nonce is bound to.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Role carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Administrator,
    Editor,
    Author,
    Subscriber,
}

impl SessionRole {
    /// Only administrators may read or change badge settings.
    pub fn can_manage_badges(&self) -> bool {
        matches!(self, SessionRole::Administrator)
    }
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Session role
    pub role: SessionRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Session id; the anti-forgery nonce is derived from it
    pub jti: String,
}

/// Signing and validation settings for session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Session lifetime in seconds
    pub session_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("session_expiry_secs", &self.session_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

impl JwtConfig {
    /// Creates a config from a shared HS256 secret.
    pub fn new(secret: &str, session_expiry_secs: i64) -> Result<Self, JwtError> {
        Self::with_leeway(secret, session_expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a config from a shared HS256 secret with custom leeway.
    pub fn with_leeway(
        secret: &str,
        session_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("secret must not be empty".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_expiry_secs,
            leeway_secs,
        })
    }

    /// Issues a session token. Returns the token and its session id.
    pub fn issue_session(
        &self,
        user_id: Uuid,
        role: SessionRole,
    ) -> Result<(String, String), JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            exp: (now + Duration::seconds(self.session_expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, jti))
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extracts user ID from validated claims.
pub fn extract_user_id(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> JwtConfig {
        JwtConfig::with_leeway("test_secret_key_for_jwt_testing_12345", 900, 0)
            .expect("valid config")
    }

    #[test]
    fn test_issue_and_validate_session() {
        let config = create_test_config();
        let user_id = Uuid::new_v4();

        let (token, jti) = config
            .issue_session(user_id, SessionRole::Administrator)
            .unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.jti, jti);
        assert_eq!(claims.role, SessionRole::Administrator);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            JwtConfig::new("", 900),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let config = create_test_config();
        let other = JwtConfig::with_leeway("another_secret", 900, 0).unwrap();
        let (token, _) = other
            .issue_session(Uuid::new_v4(), SessionRole::Administrator)
            .unwrap();

        assert!(matches!(
            config.validate_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let mut config = create_test_config();
        config.session_expiry_secs = -120;
        let (token, _) = config
            .issue_session(Uuid::new_v4(), SessionRole::Editor)
            .unwrap();

        let result = config.validate_token(&token);
        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_malformed_token() {
        let config = create_test_config();
        assert!(config.validate_token("not_a_jwt").is_err());
    }

    #[test]
    fn test_extract_user_id() {
        let config = create_test_config();
        let user_id = Uuid::new_v4();
        let (token, _) = config
            .issue_session(user_id, SessionRole::Subscriber)
            .unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(extract_user_id(&claims).unwrap(), user_id);
    }

    #[test]
    fn test_unique_jti_per_session() {
        let config = create_test_config();
        let user_id = Uuid::new_v4();
        let (_, jti1) = config
            .issue_session(user_id, SessionRole::Administrator)
            .unwrap();
        let (_, jti2) = config
            .issue_session(user_id, SessionRole::Administrator)
            .unwrap();

        assert_ne!(jti1, jti2);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(SessionRole::Administrator.can_manage_badges());
        assert!(!SessionRole::Editor.can_manage_badges());
        assert!(!SessionRole::Author.can_manage_badges());
        assert!(!SessionRole::Subscriber.can_manage_badges());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&SessionRole::Administrator).unwrap(),
            "\"administrator\""
        );
    }
}
