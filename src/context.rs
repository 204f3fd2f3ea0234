//! Cross-domain context aggregation
//!
//! Fan-out/fan-in composition of the per-request [`ContextSnapshot`]. A
//! failure in any one sub-fetch degrades that sub-list to empty and the
//! snapshot is still returned - partial context beats no prompt. This module
//! is the single place that defines "what context is relevant"; its field
//! set and ordering are a hard contract the prompt generator depends on.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::{
    CONTEXT_HABITS_LIMIT, CONTEXT_JOURNALS_LIMIT, CONTEXT_MEDIA_LIMIT, CONTEXT_MOODS_LIMIT,
    CONTEXT_TODOS_LIMIT,
};
use crate::domain::{
    Habit, HabitDirectory, JournalDirectory, JournalEntry, MediaDirectory, MediaItem,
    MoodDirectory, MoodReading, Todo, TodoDirectory,
};

/// Ephemeral, per-request view of a user's current cross-domain state
///
/// Never persisted; rebuilt on every request. Each sub-list preserves the
/// ordering given by its source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    #[serde(default)]
    pub upcoming_todos: Vec<Todo>,
    #[serde(default)]
    pub recent_moods: Vec<MoodReading>,
    #[serde(default)]
    pub active_habits: Vec<Habit>,
    #[serde(default)]
    pub recent_media: Vec<MediaItem>,
    #[serde(default)]
    pub recent_journals: Vec<JournalEntry>,
}

/// Composes the snapshot from the five domain collaborators
pub struct ContextAggregator {
    todos: Arc<dyn TodoDirectory>,
    moods: Arc<dyn MoodDirectory>,
    habits: Arc<dyn HabitDirectory>,
    media: Arc<dyn MediaDirectory>,
    journals: Arc<dyn JournalDirectory>,
}

impl ContextAggregator {
    pub fn new(
        todos: Arc<dyn TodoDirectory>,
        moods: Arc<dyn MoodDirectory>,
        habits: Arc<dyn HabitDirectory>,
        media: Arc<dyn MediaDirectory>,
        journals: Arc<dyn JournalDirectory>,
    ) -> Self {
        Self {
            todos,
            moods,
            habits,
            media,
            journals,
        }
    }

    /// Build the snapshot for a user
    ///
    /// Sub-fetches are independent and read-only; each failure is logged
    /// and degraded to an empty list without failing the aggregation.
    pub fn aggregate(&self, user_id: &str) -> ContextSnapshot {
        ContextSnapshot {
            upcoming_todos: fetch("todos", self.todos.upcoming(user_id, CONTEXT_TODOS_LIMIT)),
            recent_moods: fetch("moods", self.moods.recent(user_id, CONTEXT_MOODS_LIMIT)),
            active_habits: fetch("habits", self.habits.active(user_id, CONTEXT_HABITS_LIMIT)),
            recent_media: fetch("media", self.media.recent(user_id, CONTEXT_MEDIA_LIMIT)),
            recent_journals: fetch(
                "journals",
                self.journals.recent(user_id, CONTEXT_JOURNALS_LIMIT),
            ),
        }
    }
}

fn fetch<T>(domain: &str, result: anyhow::Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(domain, error = %e, "Context sub-fetch failed, degrading to empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        InMemoryHabits, InMemoryJournal, InMemoryMedia, InMemoryMoods, InMemoryTodos, MediaStatus,
        MediaType, MoodLevel, NewMedia, NewMood, NewTodo, TodoPriority,
    };
    use anyhow::anyhow;

    /// Media collaborator that always fails, for partial-failure tests
    struct BrokenMedia;

    impl MediaDirectory for BrokenMedia {
        fn recent(&self, _user_id: &str, _limit: usize) -> anyhow::Result<Vec<MediaItem>> {
            Err(anyhow!("media store unreachable"))
        }

        fn create(&self, _user_id: &str, _new: NewMedia) -> anyhow::Result<MediaItem> {
            Err(anyhow!("media store unreachable"))
        }
    }

    fn seeded_stores() -> (
        Arc<InMemoryTodos>,
        Arc<InMemoryMoods>,
        Arc<InMemoryHabits>,
        Arc<InMemoryMedia>,
        Arc<InMemoryJournal>,
    ) {
        let todos = Arc::new(InMemoryTodos::default());
        let moods = Arc::new(InMemoryMoods::default());
        let habits = Arc::new(InMemoryHabits::default());
        let media = Arc::new(InMemoryMedia::default());
        let journals = Arc::new(InMemoryJournal::default());

        todos
            .create(
                "alice",
                NewTodo {
                    title: "Renew passport".into(),
                    due_date: None,
                    priority: TodoPriority::High,
                },
            )
            .unwrap();
        moods
            .create(
                "alice",
                NewMood {
                    mood: MoodLevel::Good,
                    energy: None,
                },
            )
            .unwrap();
        media
            .create(
                "alice",
                NewMedia {
                    title: "Severance".into(),
                    media_type: MediaType::Show,
                    status: MediaStatus::InProgress,
                },
            )
            .unwrap();

        (todos, moods, habits, media, journals)
    }

    #[test]
    fn test_aggregate_composes_all_domains() {
        let (todos, moods, habits, media, journals) = seeded_stores();
        let aggregator = ContextAggregator::new(todos, moods, habits, media, journals);

        let snapshot = aggregator.aggregate("alice");
        assert_eq!(snapshot.upcoming_todos.len(), 1);
        assert_eq!(snapshot.recent_moods.len(), 1);
        assert!(snapshot.active_habits.is_empty());
        assert_eq!(snapshot.recent_media.len(), 1);
        assert!(snapshot.recent_journals.is_empty());
    }

    #[test]
    fn test_media_failure_degrades_only_media() {
        let (todos, moods, habits, _media, journals) = seeded_stores();
        let aggregator =
            ContextAggregator::new(todos, moods, habits, Arc::new(BrokenMedia), journals);

        let snapshot = aggregator.aggregate("alice");
        assert!(snapshot.recent_media.is_empty());
        assert_eq!(snapshot.upcoming_todos.len(), 1);
        assert_eq!(snapshot.recent_moods.len(), 1);
    }

    #[test]
    fn test_unknown_user_yields_empty_snapshot() {
        let (todos, moods, habits, media, journals) = seeded_stores();
        let aggregator = ContextAggregator::new(todos, moods, habits, media, journals);

        let snapshot = aggregator.aggregate("nobody");
        assert!(snapshot.upcoming_todos.is_empty());
        assert!(snapshot.recent_journals.is_empty());
    }
}
