//! Bearer-credential authentication
//!
//! Every protected route requires `Authorization: Bearer <token>`. The token
//! is resolved to a user identity from the configured token map and the
//! resulting [`Identity`] is inserted as a request extension, so handlers
//! receive the credential explicitly rather than reading ambient state.
//!
//! Token map format (`REVERIE_API_TOKENS`): comma-separated `user_id:token`
//! pairs, e.g. `alice:tok-a1,bob:tok-b2`.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::env;

/// Authenticated caller identity, derived from the bearer credential.
///
/// `bearer` keeps the raw token so the analysis gateway can forward the
/// caller's own credential to the engine.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub bearer: String,
}

/// Bearer authentication errors
#[derive(Debug)]
pub enum AuthError {
    MissingBearer,
    InvalidToken,
    NotConfigured,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingBearer => (
                StatusCode::UNAUTHORIZED,
                "Missing Authorization: Bearer header",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid bearer token"),
            AuthError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "API tokens not configured. Set REVERIE_API_TOKENS environment variable.",
            ),
        };

        (
            status,
            axum::Json(serde_json::json!({
                "error": message,
                "code": "AUTH_REQUIRED",
            })),
        )
            .into_response()
    }
}

/// Constant-time string comparison to prevent timing attacks
///
/// Note: This leaks the length of the shorter string, but that's acceptable
/// for API tokens where lengths are not secret.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let mut result = (a.len() ^ b.len()) as u8;

    let min_len = std::cmp::min(a.len(), b.len());
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    for i in 0..min_len {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}

/// Resolve a bearer token to a user identity using constant-time comparison
pub fn resolve_token(provided: &str) -> Result<Identity, AuthError> {
    let configured = match env::var("REVERIE_API_TOKENS") {
        Ok(tokens) if !tokens.trim().is_empty() => tokens,
        _ => {
            // In production, refuse to serve without configured tokens
            if crate::config::is_production() {
                tracing::error!("REVERIE_API_TOKENS not set in production mode");
                return Err(AuthError::NotConfigured);
            }

            // Development mode: warn but allow a default identity
            tracing::warn!(
                "REVERIE_API_TOKENS not set - using development token (not for production!)"
            );
            "dev:reverie-dev-token-change-in-production".to_string()
        }
    };

    // Check all entries without early exit to keep comparison time uniform
    let mut matched: Option<Identity> = None;
    for entry in configured.split(',') {
        let Some((user_id, token)) = entry.trim().split_once(':') else {
            continue;
        };

        if constant_time_compare(token, provided) && matched.is_none() {
            matched = Some(Identity {
                user_id: user_id.to_string(),
                bearer: provided.to_string(),
            });
        }
    }

    matched.ok_or(AuthError::InvalidToken)
}

/// Authentication middleware for protected routes
///
/// Runs before any other handler logic; absence of a valid credential is a
/// uniform 401 regardless of the route.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let token = match request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
    {
        Some(token) if !token.is_empty() => token,
        _ => return AuthError::MissingBearer.into_response(),
    };

    let identity = match resolve_token(&token) {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}
