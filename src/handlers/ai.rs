//! Analysis and prompt generation handlers
//!
//! The degraded-engine paths here intentionally answer 200 with safe
//! defaults: graceful degradation is the product contract for this surface,
//! not error hiding gone wrong.

use axum::{Extension, extract::State, response::Json};

use super::state::JournalHub;
use super::types::{AnalyzeJournalRequest, AnalyzeJournalResponse};
use crate::auth::Identity;
use crate::context::ContextSnapshot;
use crate::engine::AnalyzeRequest;
use crate::errors::{AppError, ValidationErrorExt};
use crate::extraction::{self, ConfidenceFilter};
use crate::metrics;
use crate::prompt::{PromptGenerator, PromptResponse};
use crate::rate_limit::EndpointClass;
use crate::validation;

/// Application state type alias
pub type AppState = std::sync::Arc<JournalHub>;

/// POST /ai/analyze-journal - extract life-tracking candidates from entry text
pub async fn analyze_journal(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<AnalyzeJournalRequest>,
) -> Result<Json<AnalyzeJournalResponse>, AppError> {
    state.admit(&identity, EndpointClass::RealtimeAnalysis)?;

    // Validation failures are the "failed requests" charged against the
    // real-time window: they are what retry storms are made of. A degraded
    // engine response is a success and stays free.
    if req.content.trim().is_empty() {
        state
            .rate_limiter
            .record_failure(&identity.user_id, EndpointClass::RealtimeAnalysis);
        return Err(AppError::MissingContent);
    }

    if let Err(e) = validation::validate_content(&req.content)
        .and_then(|()| validation::validate_activities(&req.activities))
    {
        state
            .rate_limiter
            .record_failure(&identity.user_id, EndpointClass::RealtimeAnalysis);
        return Err(AppError::InvalidInput {
            field: "content".to_string(),
            reason: e.to_string(),
        });
    }

    let request = AnalyzeRequest {
        content: req.content,
        mood: req.mood,
        energy: req.energy,
        activities: req.activities,
    };

    // Content is already validated, so the gateway's own guard cannot fire;
    // every engine failure below this point degrades inside the gateway.
    let analysis = state
        .gateway
        .analyze(&identity.bearer, &request)
        .await
        .map_err(|_| AppError::MissingContent)?;

    let preferences = state.preferences.get_or_default(&identity.user_id);
    let candidates = ConfidenceFilter::apply(extraction::extract(&analysis), &preferences);

    for candidate in &candidates {
        metrics::CANDIDATES_SURFACED_TOTAL
            .with_label_values(&[candidate.kind().as_str()])
            .inc();
    }

    Ok(Json(AnalyzeJournalResponse {
        analysis,
        candidates,
    }))
}

/// POST /ai/journal-prompt - generate the next journal prompt from a
/// context-snapshot-shaped body
pub async fn journal_prompt(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(snapshot): Json<ContextSnapshot>,
) -> Result<Json<PromptResponse>, AppError> {
    state.admit(&identity, EndpointClass::Suggestions)?;

    validation::validate_user_id(&identity.user_id).map_validation_err("user_id")?;

    let preferences = state.preferences.get_or_default(&identity.user_id);
    let response =
        PromptGenerator::generate(&state.gateway, &identity.bearer, &snapshot, &preferences).await;

    Ok(Json(response))
}
