//! Journal surface handlers: context, actions, entries, preferences

use axum::{
    Extension,
    extract::{Query, State},
    response::Json,
};

use super::state::JournalHub;
use super::types::PersistActionsRequest;
use crate::auth::Identity;
use crate::context::ContextSnapshot;
use crate::domain::{EntryFilter, JournalEntry, NewEntry};
use crate::errors::{AppError, ValidationErrorExt};
use crate::persist::PersistResult;
use crate::preferences::Preferences;
use crate::rate_limit::EndpointClass;
use crate::validation;

/// Application state type alias
pub type AppState = std::sync::Arc<JournalHub>;

/// GET /journal/context - rebuild the cross-domain snapshot
///
/// Partial sub-fetch failures degrade per-field inside the aggregator; this
/// handler only fails on auth or admission.
pub async fn get_context(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ContextSnapshot>, AppError> {
    state.admit(&identity, EndpointClass::ContextFetch)?;

    Ok(Json(state.aggregator.aggregate(&identity.user_id)))
}

/// POST /journal/actions - persist user-confirmed candidates
///
/// Store rejections surface as 500: silently dropping a confirmed action
/// would corrupt the product promise that confirmed suggestions get saved.
pub async fn persist_actions(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<PersistActionsRequest>,
) -> Result<Json<PersistResult>, AppError> {
    state.admit(&identity, EndpointClass::General)?;

    let result = state
        .persister
        .persist(&identity.user_id, &req.candidates)
        .map_err(|e| AppError::StoreError(e.to_string()))?;

    Ok(Json(result))
}

/// GET /journal - list entries with an optional date filter
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(filter): Query<EntryFilter>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    state.admit(&identity, EndpointClass::General)?;

    let entries = state
        .journals
        .list(&identity.user_id, &filter)
        .map_err(|e| AppError::StoreError(e.to_string()))?;

    Ok(Json(entries))
}

/// POST /journal - create a new entry
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(new): Json<NewEntry>,
) -> Result<Json<JournalEntry>, AppError> {
    state.admit(&identity, EndpointClass::General)?;

    if new.content.trim().is_empty() {
        return Err(AppError::MissingContent);
    }
    validation::validate_content(&new.content).map_validation_err("content")?;

    let entry = state
        .journals
        .create(&identity.user_id, new)
        .map_err(|e| AppError::StoreError(e.to_string()))?;

    Ok(Json(entry))
}

/// GET /journal/preferences - fetch the caller's record, defaults on first access
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Preferences>, AppError> {
    state.admit(&identity, EndpointClass::General)?;

    Ok(Json(state.preferences.get_or_default(&identity.user_id)))
}

/// PUT /journal/preferences - validate and replace the caller's record
pub async fn put_preferences(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(preferences): Json<Preferences>,
) -> Result<Json<Preferences>, AppError> {
    state.admit(&identity, EndpointClass::General)?;

    preferences
        .validate()
        .map_validation_err("confidenceThreshold")?;

    Ok(Json(
        state.preferences.replace(&identity.user_id, preferences),
    ))
}
