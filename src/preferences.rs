//! Per-user suggestion preferences
//!
//! A small, strongly typed configuration record driving the confidence filter
//! and the prompt generator. Created with defaults on first access, replaced
//! wholesale on update (last-writer-wins; the product specifies no
//! concurrent-edit conflict resolution).

use anyhow::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::validation;

/// Suggestion vocabulary a user can enable
///
/// Superset of the extraction candidate kinds: `Reflection` gates
/// reflection-style prompt suggestions rather than extraction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Todo,
    Mood,
    Habit,
    Media,
    Reflection,
}

impl SuggestionKind {
    /// Label for metrics and logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Mood => "mood",
            Self::Habit => "habit",
            Self::Media => "media",
            Self::Reflection => "reflection",
        }
    }

    pub fn all() -> BTreeSet<Self> {
        BTreeSet::from([
            Self::Todo,
            Self::Mood,
            Self::Habit,
            Self::Media,
            Self::Reflection,
        ])
    }
}

/// Tone of the generated journal prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    #[default]
    Reflective,
    Analytical,
    Creative,
    Motivational,
}

/// Per-user preference record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Minimum confidence a candidate must meet to be surfaced
    pub confidence_threshold: f32,
    /// Candidate/suggestion kinds the user wants to see
    pub suggestion_types: BTreeSet<SuggestionKind>,
    /// Preferred prompt tone
    #[serde(default)]
    pub prompt_style: PromptStyle,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            suggestion_types: SuggestionKind::all(),
            prompt_style: PromptStyle::default(),
        }
    }
}

impl Preferences {
    /// Validate field ranges before accepting a replacement record
    pub fn validate(&self) -> Result<()> {
        validation::validate_confidence_threshold(self.confidence_threshold)
    }
}

/// Process-local preference store keyed by user
///
/// Read-mostly; a plain concurrent map gives the required last-writer-wins
/// semantics without further coordination.
#[derive(Default)]
pub struct PreferenceStore {
    records: DashMap<String, Preferences>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the user's record, creating the default on first access
    pub fn get_or_default(&self, user_id: &str) -> Preferences {
        self.records
            .entry(user_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Replace the user's record wholesale
    pub fn replace(&self, user_id: &str, preferences: Preferences) -> Preferences {
        self.records
            .insert(user_id.to_string(), preferences.clone());
        preferences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.confidence_threshold, 0.7);
        assert_eq!(prefs.suggestion_types, SuggestionKind::all());
        assert_eq!(prefs.prompt_style, PromptStyle::Reflective);
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut prefs = Preferences::default();
        assert!(prefs.validate().is_ok());

        prefs.confidence_threshold = 1.2;
        assert!(prefs.validate().is_err());

        prefs.confidence_threshold = -0.1;
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_first_access_creates_default() {
        let store = PreferenceStore::new();
        assert_eq!(store.get_or_default("alice"), Preferences::default());
    }

    #[test]
    fn test_replace_round_trips() {
        let store = PreferenceStore::new();
        let custom = Preferences {
            confidence_threshold: 0.8,
            suggestion_types: BTreeSet::from([SuggestionKind::Mood, SuggestionKind::Reflection]),
            prompt_style: PromptStyle::Analytical,
        };

        store.replace("alice", custom.clone());
        assert_eq!(store.get_or_default("alice"), custom);
    }

    #[test]
    fn test_wire_shape_matches_client_contract() {
        let json = serde_json::json!({
            "confidenceThreshold": 0.8,
            "suggestionTypes": ["mood", "reflection"],
            "promptStyle": "analytical",
        });

        let prefs: Preferences = serde_json::from_value(json).unwrap();
        assert_eq!(prefs.confidence_threshold, 0.8);
        assert!(prefs.suggestion_types.contains(&SuggestionKind::Reflection));
        assert_eq!(prefs.prompt_style, PromptStyle::Analytical);

        // Round trip preserves the record identically
        let round: Preferences =
            serde_json::from_value(serde_json::to_value(&prefs).unwrap()).unwrap();
        assert_eq!(round, prefs);
    }

    #[test]
    fn test_unknown_suggestion_kind_is_rejected() {
        let json = serde_json::json!({
            "confidenceThreshold": 0.5,
            "suggestionTypes": ["mood", "teleportation"],
            "promptStyle": "creative",
        });
        assert!(serde_json::from_value::<Preferences>(json).is_err());
    }
}
