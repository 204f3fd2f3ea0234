//! Adaptive journal prompt generation
//!
//! Projects the context snapshot down to the minimal fields the engine
//! needs, sends it with the user's prompt style, and falls back to a fixed
//! prompt on ANY failure. The fallback is a successful outcome - the prompt
//! surface never fails visibly to the end user.

use serde::Serialize;

use crate::context::ContextSnapshot;
use crate::engine::AnalysisGateway;
use crate::metrics;
use crate::preferences::Preferences;

/// Returned when the engine cannot produce a personalized prompt
pub const FALLBACK_PROMPT: &str = "What's on your mind today?";

/// Response shape for the prompt surface
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct PromptResponse {
    pub prompt: String,
}

// Minimal field projections forwarded to the engine. Journal entries are
// passed through unmodified.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectedTodo<'a> {
    title: &'a str,
    due_date: Option<chrono::DateTime<chrono::Utc>>,
    priority: crate::domain::TodoPriority,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectedMood {
    mood: crate::domain::MoodLevel,
    date: chrono::DateTime<chrono::Utc>,
    energy: Option<crate::domain::EnergyLevel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectedHabit<'a> {
    name: &'a str,
    streak: u32,
    frequency: crate::domain::HabitFrequency,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectedMedia<'a> {
    title: &'a str,
    #[serde(rename = "type")]
    media_type: crate::domain::MediaType,
    status: crate::domain::MediaStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptPayload<'a> {
    style: crate::preferences::PromptStyle,
    todos: Vec<ProjectedTodo<'a>>,
    moods: Vec<ProjectedMood>,
    habits: Vec<ProjectedHabit<'a>>,
    media: Vec<ProjectedMedia<'a>>,
    journals: &'a [crate::domain::JournalEntry],
}

/// Generates the next journal prompt from aggregated context
pub struct PromptGenerator;

impl PromptGenerator {
    /// Build the engine payload from a snapshot and preferences
    fn project<'a>(snapshot: &'a ContextSnapshot, preferences: &Preferences) -> PromptPayload<'a> {
        PromptPayload {
            style: preferences.prompt_style,
            todos: snapshot
                .upcoming_todos
                .iter()
                .map(|t| ProjectedTodo {
                    title: &t.title,
                    due_date: t.due_date,
                    priority: t.priority,
                })
                .collect(),
            moods: snapshot
                .recent_moods
                .iter()
                .map(|m| ProjectedMood {
                    mood: m.mood,
                    date: m.date,
                    energy: m.energy,
                })
                .collect(),
            habits: snapshot
                .active_habits
                .iter()
                .map(|h| ProjectedHabit {
                    name: &h.name,
                    streak: h.streak,
                    frequency: h.frequency,
                })
                .collect(),
            media: snapshot
                .recent_media
                .iter()
                .map(|m| ProjectedMedia {
                    title: &m.title,
                    media_type: m.media_type,
                    status: m.status,
                })
                .collect(),
            journals: &snapshot.recent_journals,
        }
    }

    /// Generate a prompt, falling back to [`FALLBACK_PROMPT`] on any failure
    pub async fn generate(
        gateway: &AnalysisGateway,
        bearer: &str,
        snapshot: &ContextSnapshot,
        preferences: &Preferences,
    ) -> PromptResponse {
        let payload = match serde_json::to_value(Self::project(snapshot, preferences)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt payload serialization failed, using fallback");
                metrics::PROMPT_FALLBACK_TOTAL.inc();
                return PromptResponse {
                    prompt: FALLBACK_PROMPT.to_string(),
                };
            }
        };

        match gateway.prompt_raw(bearer, &payload).await {
            Ok(reply) if !reply.prompt.trim().is_empty() => PromptResponse {
                prompt: reply.prompt,
            },
            Ok(_) => {
                tracing::warn!("Engine returned an empty prompt, using fallback");
                metrics::PROMPT_FALLBACK_TOTAL.inc();
                PromptResponse {
                    prompt: FALLBACK_PROMPT.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prompt generation failed, using fallback");
                metrics::PROMPT_FALLBACK_TOTAL.inc();
                PromptResponse {
                    prompt: FALLBACK_PROMPT.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::domain::{MediaItem, MediaStatus, MediaType, Todo, TodoPriority};
    use chrono::Utc;
    use uuid::Uuid;

    fn snapshot() -> ContextSnapshot {
        ContextSnapshot {
            upcoming_todos: vec![Todo {
                id: Uuid::new_v4(),
                title: "Finish report".into(),
                due_date: None,
                priority: TodoPriority::High,
                completed: false,
                created_at: Utc::now(),
            }],
            recent_media: vec![MediaItem {
                id: Uuid::new_v4(),
                title: "Dune".into(),
                media_type: MediaType::Book,
                status: MediaStatus::InProgress,
                created_at: Utc::now(),
            }],
            ..ContextSnapshot::default()
        }
    }

    #[test]
    fn test_projection_keeps_only_minimal_fields() {
        let prefs = Preferences::default();
        let snap = snapshot();
        let payload = serde_json::to_value(PromptGenerator::project(&snap, &prefs)).unwrap();

        assert_eq!(payload["style"], "reflective");
        assert_eq!(payload["todos"][0]["title"], "Finish report");
        // Internal record fields are projected away
        assert!(payload["todos"][0].get("id").is_none());
        assert!(payload["todos"][0].get("completed").is_none());
        assert_eq!(payload["media"][0]["type"], "book");
        assert!(payload["media"][0].get("createdAt").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_engine_falls_back() {
        let config = ServerConfig {
            engine_url: "http://127.0.0.1:9".to_string(),
            engine_timeout: std::time::Duration::from_millis(500),
            ..ServerConfig::default()
        };
        let gateway = AnalysisGateway::new(&config);

        let response =
            PromptGenerator::generate(&gateway, "tok", &snapshot(), &Preferences::default()).await;
        assert_eq!(response.prompt, FALLBACK_PROMPT);
    }
}
