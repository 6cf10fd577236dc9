use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::models::GroupPayloadError;
use persistence::repositories::BadgeGroupError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Anti-forgery nonce missing or not valid for the session.
    #[error("Invalid nonce")]
    InvalidNonce,

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited { retry_after_secs: u64 },

    /// Storage failure. The detail is logged, never sent to the client.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorData {
    status: u16,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    data: ErrorData,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) | ApiError::InvalidNonce | ApiError::DeleteFailed(_) => {
                StatusCode::FORBIDDEN
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code sent to the admin UI.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "rest_not_logged_in",
            ApiError::Forbidden(_) => "rest_forbidden_capability",
            ApiError::InvalidNonce => "rest_cookie_invalid_nonce",
            ApiError::DeleteFailed(_) => "delete_failed",
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "invalid_group_data",
            ApiError::RateLimited { .. } => "rate_limit_exceeded",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::DeleteFailed(msg)
            | ApiError::NotFound(msg)
            | ApiError::Validation(msg) => msg.clone(),
            ApiError::InvalidNonce => {
                "Your session has expired. Please refresh the page and try again.".to_string()
            }
            ApiError::RateLimited { .. } => {
                "Too many requests. Please try again later.".to_string()
            }
            ApiError::Database(detail) => {
                tracing::error!(error = %detail, "Database error");
                "A database error occurred".to_string()
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                "An internal error occurred".to_string()
            }
        };

        let body = ErrorBody {
            code,
            message,
            data: ErrorData {
                status: status.as_u16(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl From<BadgeGroupError> for ApiError {
    fn from(err: BadgeGroupError) -> Self {
        match err {
            BadgeGroupError::NotFound(id) => {
                ApiError::NotFound(format!("Badge group '{id}' not found"))
            }
            BadgeGroupError::DefaultGroupProtected(id) => {
                ApiError::DeleteFailed(format!("Cannot delete default group '{id}'"))
            }
            BadgeGroupError::Storage(e) => e.into(),
        }
    }
}

impl From<GroupPayloadError> for ApiError {
    fn from(err: GroupPayloadError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                })
            })
            .collect();

        let message = if messages.len() == 1 {
            messages[0].clone()
        } else {
            format!("{} validation errors", messages.len())
        };

        ApiError::Validation(message)
    }
}
