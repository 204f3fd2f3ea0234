//! Structured error types with stable codes and HTTP mappings
//!
//! One taxonomy for the whole surface: validation (400), missing credential
//! (401), rate-limit denial (429 with a retry hint), store failures (500).
//! Upstream engine failures are deliberately absent here: the gateway and
//! prompt generator convert them into well-formed default values before a
//! handler ever sees them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code
    pub code: String,

    /// Seconds until the client may retry (rate-limit denials only)
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Application error types with proper categorization
#[derive(Debug)]
pub enum AppError {
    // Validation errors (400)
    InvalidInput { field: String, reason: String },
    MissingContent,

    // Auth errors (401) - checked before any other logic
    AuthRequired(String),

    // Rate limiting (429) - a normal, typed outcome, never a panic
    RateLimited { retry_after_secs: u64 },

    // Store failures (500) - surfaced, never silently degraded
    StoreError(String),

    // Generic wrapper for internal errors
    Internal(anyhow::Error),
}

impl AppError {
    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::MissingContent => "CONTENT_REQUIRED",
            Self::AuthRequired(_) => "AUTH_REQUIRED",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::StoreError(_) => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } | Self::MissingContent => StatusCode::BAD_REQUEST,
            Self::AuthRequired(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::StoreError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get detailed error message
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason } => {
                format!("Invalid input for field '{field}': {reason}")
            }
            Self::MissingContent => "Content is required".to_string(),
            Self::AuthRequired(msg) => msg.clone(),
            Self::RateLimited { retry_after_secs } => {
                format!("Too many requests, retry in {retry_after_secs}s")
            }
            Self::StoreError(msg) => format!("Store error: {msg}"),
            Self::Internal(err) => format!("Internal error: {err}"),
        }
    }

    /// Convert to structured error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message(),
            code: self.code().to_string(),
            retry_after: match self {
                Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
                _ => None,
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_response();

        (status, Json(body)).into_response()
    }
}

/// Helper trait to convert validation errors
pub trait ValidationErrorExt<T> {
    fn map_validation_err(self, field: &str) -> Result<T>;
}

impl<T> ValidationErrorExt<T> for anyhow::Result<T> {
    fn map_validation_err(self, field: &str) -> Result<T> {
        self.map_err(|e| AppError::InvalidInput {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::MissingContent.code(), "CONTENT_REQUIRED");
        assert_eq!(
            AppError::RateLimited {
                retry_after_secs: 30
            }
            .code(),
            "RATE_LIMITED"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::MissingContent.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AuthRequired("Missing bearer token".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::RateLimited {
                retry_after_secs: 10
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::StoreError("write failed".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_content_message_is_exact() {
        // Clients match on this string; it is part of the API contract.
        assert_eq!(AppError::MissingContent.message(), "Content is required");
    }

    #[test]
    fn test_rate_limited_response_carries_retry_hint() {
        let err = AppError::RateLimited {
            retry_after_secs: 42,
        };
        let response = err.to_response();

        assert_eq!(response.code, "RATE_LIMITED");
        assert_eq!(response.retry_after, Some(42));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["retryAfter"], 42);
    }

    #[test]
    fn test_retry_after_omitted_for_other_errors() {
        let json = serde_json::to_value(AppError::MissingContent.to_response()).unwrap();
        assert!(json.get("retryAfter").is_none());
    }
}
