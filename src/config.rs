//! Configuration management for the journal server
//!
//! All configurable parameters in one place with environment variable
//! overrides. Follows the principle: sensible defaults, configurable in
//! production.

use std::env;
use std::time::Duration;
use tracing::info;

use crate::constants::{
    ENGINE_TIMEOUT_SECS_DEFAULT, ENGINE_URL_DEFAULT, MAX_CONCURRENT_REQUESTS_DEFAULT,
    SERVER_PORT_DEFAULT,
};

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache (seconds)
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(), // Empty = allow all origins
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "PUT".to_string(),
                "DELETE".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
                "X-Request-ID".to_string(),
            ],
            max_age_seconds: 86400, // 24 hours
        }
    }
}

impl CorsConfig {
    /// Load from environment variables with production safety checks
    ///
    /// In production mode (REVERIE_ENV=production), warns if CORS origins
    /// are not configured.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("REVERIE_CORS_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(methods) = env::var("REVERIE_CORS_METHODS") {
            config.allowed_methods = methods
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(headers) = env::var("REVERIE_CORS_HEADERS") {
            config.allowed_headers = headers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = env::var("REVERIE_CORS_MAX_AGE") {
            if let Ok(n) = val.parse() {
                config.max_age_seconds = n;
            }
        }

        if is_production() && config.allowed_origins.is_empty() {
            tracing::warn!(
                "PRODUCTION WARNING: CORS allows all origins. Set REVERIE_CORS_ORIGINS for security."
            );
        }

        config
    }

    /// Convert to tower-http CorsLayer
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new();

        if self.allowed_origins.is_empty() {
            // Intentionally permissive - no origins configured
            layer = layer.allow_origin(Any);
        } else {
            let mut valid_origins = Vec::new();

            for origin_str in &self.allowed_origins {
                match origin_str.parse::<axum::http::HeaderValue>() {
                    Ok(origin) => valid_origins.push(origin),
                    Err(_) => tracing::warn!("CORS: Invalid origin '{}' - skipping", origin_str),
                }
            }

            if valid_origins.is_empty() {
                // All configured origins failed to parse - this is a config
                // error. Do NOT fall back to permissive.
                tracing::error!(
                    "CORS: All {} configured origin(s) failed to parse. \
                     Rejecting all cross-origin requests. Fix REVERIE_CORS_ORIGINS.",
                    self.allowed_origins.len()
                );
                layer =
                    layer.allow_origin(AllowOrigin::list(Vec::<axum::http::HeaderValue>::new()));
            } else {
                layer = layer.allow_origin(AllowOrigin::list(valid_origins));
            }
        }

        let methods: Vec<axum::http::Method> = self
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        if methods.is_empty() {
            layer = layer.allow_methods(Any);
        } else {
            layer = layer.allow_methods(methods);
        }

        let headers: Vec<axum::http::HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if headers.is_empty() {
            layer = layer.allow_headers(Any);
        } else {
            layer = layer.allow_headers(headers);
        }

        layer.max_age(Duration::from_secs(self.max_age_seconds))
    }
}

/// Whether the process is running in production mode
pub fn is_production() -> bool {
    env::var("REVERIE_ENV")
        .map(|v| {
            let v = v.to_lowercase();
            v == "production" || v == "prod"
        })
        .unwrap_or(false)
}

/// Server configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: 127.0.0.1)
    /// Set to 0.0.0.0 for Docker or network-accessible deployments
    pub host: String,

    /// Server port (default: 4040)
    pub port: u16,

    /// Base URL of the external analysis engine
    pub engine_url: String,

    /// Per-call timeout for engine requests
    pub engine_timeout: Duration,

    /// Maximum concurrent requests (default: 200)
    pub max_concurrent_requests: usize,

    /// Whether running in production mode
    pub is_production: bool,

    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: SERVER_PORT_DEFAULT,
            engine_url: ENGINE_URL_DEFAULT.to_string(),
            engine_timeout: Duration::from_secs(ENGINE_TIMEOUT_SECS_DEFAULT),
            max_concurrent_requests: MAX_CONCURRENT_REQUESTS_DEFAULT,
            is_production: false,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self {
            is_production: is_production(),
            cors: CorsConfig::from_env(),
            ..Self::default()
        };

        if let Ok(host) = env::var("REVERIE_HOST") {
            config.host = host;
        }

        if let Ok(val) = env::var("REVERIE_PORT") {
            if let Ok(n) = val.parse() {
                config.port = n;
            }
        }

        if let Ok(url) = env::var("REVERIE_ENGINE_URL") {
            config.engine_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(val) = env::var("REVERIE_ENGINE_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                config.engine_timeout = Duration::from_secs(n);
            }
        }

        if let Ok(val) = env::var("REVERIE_MAX_CONCURRENT") {
            if let Ok(n) = val.parse() {
                config.max_concurrent_requests = n;
            }
        }

        config
    }

    /// Log the effective configuration at startup
    pub fn log(&self) {
        info!(
            host = %self.host,
            port = self.port,
            engine_url = %self.engine_url,
            engine_timeout_secs = self.engine_timeout.as_secs(),
            max_concurrent = self.max_concurrent_requests,
            production = self.is_production,
            "Server configuration loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, SERVER_PORT_DEFAULT);
        assert_eq!(config.engine_url, ENGINE_URL_DEFAULT);
        assert!(!config.is_production);
    }

    #[test]
    fn test_cors_default_is_permissive() {
        let cors = CorsConfig::default();
        assert!(cors.allowed_origins.is_empty());
        assert!(cors.allowed_methods.contains(&"PUT".to_string()));
    }
}
