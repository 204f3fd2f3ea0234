//! Persistence of user-confirmed candidates
//!
//! The one operation in the core that is allowed to fail visibly: a store
//! rejection surfaces as an explicit error, because silently dropping a
//! user-confirmed action would break the product's promise that confirmed
//! suggestions get saved.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    HabitDirectory, MediaDirectory, MoodDirectory, NewHabit, NewMedia, NewMood, NewTodo,
    TodoDirectory,
};
use crate::extraction::{CandidatePayload, ExtractedCandidate};
use crate::preferences::SuggestionKind;

/// A candidate plus the user's confirmation decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateConfirmation {
    #[serde(flatten)]
    pub candidate: ExtractedCandidate,
    #[serde(default)]
    pub confirmed: bool,
}

/// One record created from a confirmed candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRecord {
    pub kind: SuggestionKind,
    pub id: Uuid,
}

/// Outcome of persisting a batch of confirmations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistResult {
    pub created: Vec<CreatedRecord>,
    /// Candidates skipped because they were not confirmed
    pub skipped: usize,
}

/// Forwards confirmed candidates to the owning domain stores
pub struct ActionPersister {
    todos: Arc<dyn TodoDirectory>,
    moods: Arc<dyn MoodDirectory>,
    habits: Arc<dyn HabitDirectory>,
    media: Arc<dyn MediaDirectory>,
}

impl ActionPersister {
    pub fn new(
        todos: Arc<dyn TodoDirectory>,
        moods: Arc<dyn MoodDirectory>,
        habits: Arc<dyn HabitDirectory>,
        media: Arc<dyn MediaDirectory>,
    ) -> Self {
        Self {
            todos,
            moods,
            habits,
            media,
        }
    }

    /// Persist every confirmed candidate, in order
    ///
    /// The first store rejection aborts the batch with an error; records
    /// created before the failure stay created (no rollback across stores).
    pub fn persist(
        &self,
        user_id: &str,
        confirmations: &[CandidateConfirmation],
    ) -> Result<PersistResult> {
        let mut result = PersistResult::default();

        for confirmation in confirmations {
            if !confirmation.confirmed {
                result.skipped += 1;
                continue;
            }

            let record = self
                .persist_one(user_id, &confirmation.candidate)
                .context("Failed to persist confirmed candidate")?;
            result.created.push(record);
        }

        Ok(result)
    }

    fn persist_one(&self, user_id: &str, candidate: &ExtractedCandidate) -> Result<CreatedRecord> {
        match &candidate.payload {
            CandidatePayload::Todo(todo) => {
                let created = self.todos.create(
                    user_id,
                    NewTodo {
                        title: todo.title.clone(),
                        due_date: todo
                            .due_date
                            .as_deref()
                            .and_then(parse_due_date),
                        priority: todo.priority,
                    },
                )?;
                Ok(CreatedRecord {
                    kind: SuggestionKind::Todo,
                    id: created.id,
                })
            }
            CandidatePayload::Mood(mood) => {
                let created = self.moods.create(
                    user_id,
                    NewMood {
                        mood: mood.mood,
                        energy: mood.energy,
                    },
                )?;
                Ok(CreatedRecord {
                    kind: SuggestionKind::Mood,
                    id: created.id,
                })
            }
            CandidatePayload::Habit(habit) => {
                let created = self.habits.create(
                    user_id,
                    NewHabit {
                        name: habit.name.clone(),
                        frequency: habit.frequency,
                    },
                )?;
                Ok(CreatedRecord {
                    kind: SuggestionKind::Habit,
                    id: created.id,
                })
            }
            CandidatePayload::Media(media) => {
                let created = self.media.create(
                    user_id,
                    NewMedia {
                        title: media.title.clone(),
                        media_type: media.media_type,
                        status: crate::domain::MediaStatus::default(),
                    },
                )?;
                Ok(CreatedRecord {
                    kind: SuggestionKind::Media,
                    id: created.id,
                })
            }
        }
    }
}

/// Parse an engine-supplied due date, which may be a date or a full timestamp
fn parse_due_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    use chrono::{NaiveDate, TimeZone, Utc};

    if let Ok(dt) = s.parse::<chrono::DateTime<Utc>>() {
        return Some(dt);
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        InMemoryHabits, InMemoryMedia, InMemoryMoods, InMemoryTodos, MoodLevel, TodoPriority,
    };
    use crate::extraction::{MoodCandidate, TodoCandidate};
    use anyhow::anyhow;

    struct RejectingTodos;

    impl TodoDirectory for RejectingTodos {
        fn upcoming(&self, _user_id: &str, _limit: usize) -> Result<Vec<crate::domain::Todo>> {
            Ok(Vec::new())
        }

        fn create(&self, _user_id: &str, _new: NewTodo) -> Result<crate::domain::Todo> {
            Err(anyhow!("todo store rejected the write"))
        }
    }

    fn todo_confirmation(confirmed: bool) -> CandidateConfirmation {
        CandidateConfirmation {
            candidate: ExtractedCandidate {
                payload: CandidatePayload::Todo(TodoCandidate {
                    title: "Call the dentist".into(),
                    due_date: Some("2026-08-10".into()),
                    priority: TodoPriority::High,
                }),
                confidence: 0.95,
            },
            confirmed,
        }
    }

    fn mood_confirmation() -> CandidateConfirmation {
        CandidateConfirmation {
            candidate: ExtractedCandidate {
                payload: CandidatePayload::Mood(MoodCandidate {
                    mood: MoodLevel::Good,
                    energy: None,
                }),
                confidence: 0.85,
            },
            confirmed: true,
        }
    }

    fn working_persister() -> (ActionPersister, Arc<InMemoryTodos>) {
        let todos = Arc::new(InMemoryTodos::default());
        let persister = ActionPersister::new(
            todos.clone(),
            Arc::new(InMemoryMoods::default()),
            Arc::new(InMemoryHabits::default()),
            Arc::new(InMemoryMedia::default()),
        );
        (persister, todos)
    }

    #[test]
    fn test_persists_confirmed_candidates_only() {
        let (persister, todos) = working_persister();

        let result = persister
            .persist(
                "alice",
                &[
                    todo_confirmation(true),
                    todo_confirmation(false),
                    mood_confirmation(),
                ],
            )
            .unwrap();

        assert_eq!(result.created.len(), 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.created[0].kind, SuggestionKind::Todo);
        assert_eq!(result.created[1].kind, SuggestionKind::Mood);

        // The confirmed todo landed in the store with its due date parsed
        let stored = todos.upcoming("alice", 10).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].due_date.is_some());
    }

    #[test]
    fn test_store_rejection_surfaces_as_error() {
        let persister = ActionPersister::new(
            Arc::new(RejectingTodos),
            Arc::new(InMemoryMoods::default()),
            Arc::new(InMemoryHabits::default()),
            Arc::new(InMemoryMedia::default()),
        );

        let err = persister
            .persist("alice", &[todo_confirmation(true)])
            .unwrap_err();
        assert!(err.to_string().contains("Failed to persist"));
    }

    #[test]
    fn test_parse_due_date() {
        assert!(parse_due_date("2026-08-10").is_some());
        assert!(parse_due_date("2026-08-10T12:30:00Z").is_some());
        assert!(parse_due_date("next tuesday").is_none());
    }
}
