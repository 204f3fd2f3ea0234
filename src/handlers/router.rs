//! Router configuration - centralized route definitions
//!
//! Routes are split into public (no auth) and protected (bearer auth
//! required). The auth middleware is applied by the caller so tests can
//! exercise both wired and unwired routers.

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use super::state::JournalHub;
use super::{ai, health, journal};

/// Application state type alias
pub type AppState = Arc<JournalHub>;

/// Build the public routes (no authentication required)
///
/// These must always be accessible for health checks (Kubernetes probes)
/// and metrics (Prometheus scraping).
pub fn build_public_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        .route("/metrics", get(health::metrics_endpoint))
        .with_state(state)
}

/// Build the protected API routes (bearer authentication required)
///
/// The auth middleware should be applied by the caller; per-endpoint-class
/// rate limiting happens inside the handlers.
pub fn build_protected_routes(state: AppState) -> Router {
    Router::new()
        // =================================================================
        // ANALYSIS PIPELINE
        // =================================================================
        .route("/ai/analyze-journal", post(ai::analyze_journal))
        .route("/ai/journal-prompt", post(ai::journal_prompt))
        // =================================================================
        // JOURNAL SURFACE
        // =================================================================
        .route("/journal/context", get(journal::get_context))
        .route("/journal/actions", post(journal::persist_actions))
        .route("/journal", get(journal::list_entries))
        .route("/journal", post(journal::create_entry))
        // =================================================================
        // PREFERENCES
        // =================================================================
        .route("/journal/preferences", get(journal::get_preferences))
        .route("/journal/preferences", put(journal::put_preferences))
        // =================================================================
        // STATE
        // =================================================================
        .with_state(state)
}

/// Build the complete router with both public and protected routes
///
/// Note: This function does NOT apply auth middleware. The caller (main.rs)
/// should apply that layer to the protected routes.
pub fn build_router(state: AppState) -> Router {
    let public = build_public_routes(state.clone());
    let protected = build_protected_routes(state);

    Router::new().merge(public).merge(protected)
}
