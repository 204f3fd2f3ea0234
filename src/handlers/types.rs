//! API request/response types
//!
//! All HTTP request and response structures for the journal server.

use serde::{Deserialize, Serialize};

use crate::domain::{EnergyLevel, MoodLevel};
use crate::engine::AnalysisResult;
use crate::extraction::ExtractedCandidate;
use crate::persist::CandidateConfirmation;

// =============================================================================
// HEALTH & INFRASTRUCTURE
// =============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

// =============================================================================
// ANALYSIS API
// =============================================================================

/// POST /ai/analyze-journal request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeJournalRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mood: Option<MoodLevel>,
    #[serde(default)]
    pub energy: Option<EnergyLevel>,
    #[serde(default)]
    pub activities: Vec<String>,
}

/// POST /ai/analyze-journal response
///
/// `candidates` carries the preference-filtered extraction output alongside
/// the raw analysis.
#[derive(Debug, Serialize)]
pub struct AnalyzeJournalResponse {
    pub analysis: AnalysisResult,
    pub candidates: Vec<ExtractedCandidate>,
}

// =============================================================================
// ACTIONS API
// =============================================================================

/// POST /journal/actions request body
#[derive(Debug, Deserialize)]
pub struct PersistActionsRequest {
    pub candidates: Vec<CandidateConfirmation>,
}
