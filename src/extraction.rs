//! Extraction pipeline and confidence filter
//!
//! Converts a raw [`AnalysisResult`] into typed, confidence-scored
//! candidates, then applies the user's preference policy. Candidates are
//! produced fresh per analysis call and never mutated - only filtered or
//! persisted.

use serde::{Deserialize, Serialize};

use crate::domain::{EnergyLevel, MoodLevel, TodoPriority};
use crate::engine::AnalysisResult;
use crate::preferences::{Preferences, SuggestionKind};

// =============================================================================
// CANDIDATE TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoCandidate {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: TodoPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodCandidate {
    pub mood: MoodLevel,
    #[serde(default)]
    pub energy: Option<EnergyLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCandidate {
    pub name: String,
    #[serde(default)]
    pub frequency: crate::domain::HabitFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCandidate {
    pub title: String,
    #[serde(default)]
    pub media_type: crate::domain::MediaType,
}

/// Kind-specific candidate payload, tagged for the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum CandidatePayload {
    Todo(TodoCandidate),
    Mood(MoodCandidate),
    Habit(HabitCandidate),
    Media(MediaCandidate),
}

/// A structured life-tracking proposal extracted from entry text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCandidate {
    #[serde(flatten)]
    pub payload: CandidatePayload,
    pub confidence: f32,
}

impl ExtractedCandidate {
    /// The suggestion kind this candidate falls under
    pub fn kind(&self) -> SuggestionKind {
        match self.payload {
            CandidatePayload::Todo(_) => SuggestionKind::Todo,
            CandidatePayload::Mood(_) => SuggestionKind::Mood,
            CandidatePayload::Habit(_) => SuggestionKind::Habit,
            CandidatePayload::Media(_) => SuggestionKind::Media,
        }
    }
}

// =============================================================================
// EXTRACTION PIPELINE
// =============================================================================

/// Confidence assigned when the engine omits a score.
///
/// Absence is treated as zero so an unscored candidate is excluded by any
/// positive threshold (conservative exclusion).
const MISSING_CONFIDENCE: f32 = 0.0;

/// Map the raw extraction block into typed candidates.
///
/// Output is kind-grouped - todos, then moods, then habits, then media -
/// preserving the engine's order within each group, so the result is
/// deterministic and testable. Confidence values are clamped to [0, 1].
pub fn extract(analysis: &AnalysisResult) -> Vec<ExtractedCandidate> {
    let extracted = &analysis.extracted;
    let mut candidates = Vec::new();

    for todo in &extracted.todos {
        if todo.title.trim().is_empty() {
            continue;
        }
        candidates.push(ExtractedCandidate {
            payload: CandidatePayload::Todo(TodoCandidate {
                title: todo.title.clone(),
                due_date: todo.due_date.clone(),
                priority: todo
                    .priority
                    .as_deref()
                    .and_then(parse_priority)
                    .unwrap_or_default(),
            }),
            confidence: score(todo.confidence),
        });
    }

    if !extracted.mood.trim().is_empty() {
        if let Some(mood) = MoodLevel::from_str_loose(&extracted.mood) {
            candidates.push(ExtractedCandidate {
                payload: CandidatePayload::Mood(MoodCandidate { mood, energy: None }),
                confidence: score(extracted.mood_confidence),
            });
        }
    }

    for habit in &extracted.habits {
        if habit.name.trim().is_empty() {
            continue;
        }
        candidates.push(ExtractedCandidate {
            payload: CandidatePayload::Habit(HabitCandidate {
                name: habit.name.clone(),
                frequency: habit
                    .frequency
                    .as_deref()
                    .and_then(crate::domain::HabitFrequency::from_str_loose)
                    .unwrap_or_default(),
            }),
            confidence: score(habit.confidence),
        });
    }

    for media in &extracted.media {
        if media.title.trim().is_empty() {
            continue;
        }
        candidates.push(ExtractedCandidate {
            payload: CandidatePayload::Media(MediaCandidate {
                title: media.title.clone(),
                media_type: media
                    .media_type
                    .as_deref()
                    .and_then(crate::domain::MediaType::from_str_loose)
                    .unwrap_or_default(),
            }),
            confidence: score(media.confidence),
        });
    }

    candidates
}

fn score(confidence: Option<f32>) -> f32 {
    confidence.unwrap_or(MISSING_CONFIDENCE).clamp(0.0, 1.0)
}

fn parse_priority(s: &str) -> Option<TodoPriority> {
    match s.trim().to_lowercase().as_str() {
        "high" | "urgent" => Some(TodoPriority::High),
        "medium" | "normal" => Some(TodoPriority::Medium),
        "low" => Some(TodoPriority::Low),
        _ => None,
    }
}

// =============================================================================
// CONFIDENCE FILTER
// =============================================================================

/// Preference-driven candidate policy
pub struct ConfidenceFilter;

impl ConfidenceFilter {
    /// Retain a candidate iff its confidence meets the threshold AND its
    /// kind is enabled. Both checks are required; an empty kind set yields
    /// zero candidates regardless of confidence. Relative order is
    /// preserved.
    pub fn apply(
        candidates: Vec<ExtractedCandidate>,
        preferences: &Preferences,
    ) -> Vec<ExtractedCandidate> {
        candidates
            .into_iter()
            .filter(|c| {
                c.confidence >= preferences.confidence_threshold
                    && preferences.suggestion_types.contains(&c.kind())
            })
            .collect()
    }
}
