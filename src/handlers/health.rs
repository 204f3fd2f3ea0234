//! Health and infrastructure handlers
//!
//! Probes and metrics; always public so monitoring keeps working when auth
//! or the engine is misconfigured.

use axum::{extract::State, http::StatusCode, response::Json};

use super::state::JournalHub;
use super::types::HealthResponse;
use crate::metrics;

/// Application state type alias
pub type AppState = std::sync::Arc<JournalHub>;

/// Main health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Liveness probe - 200 whenever the process can answer at all
pub async fn health_live() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Readiness probe
///
/// The engine being down does not make us unready - the pipeline degrades
/// instead of failing, so the service can take traffic regardless.
pub async fn health_ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ready",
            "version": env!("CARGO_PKG_VERSION"),
            "engine_url": state.server_config().engine_url,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint() -> String {
    metrics::gather()
}
