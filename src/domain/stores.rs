//! Store collaborator traits and in-memory implementations
//!
//! Each domain has its own directory trait so the aggregator and persister
//! can be exercised against failing collaborators in tests. The in-memory
//! implementations key records by user and own the ordering contract of each
//! listing (the aggregator must not reorder).

use anyhow::Result;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::types::{
    Habit, JournalEntry, MediaItem, MoodReading, NewEntry, NewHabit, NewMedia, NewMood, NewTodo,
    Todo,
};

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

pub trait TodoDirectory: Send + Sync {
    /// Incomplete todos, soonest due date first (undated last)
    fn upcoming(&self, user_id: &str, limit: usize) -> Result<Vec<Todo>>;
    fn create(&self, user_id: &str, new: NewTodo) -> Result<Todo>;
}

pub trait MoodDirectory: Send + Sync {
    /// Most recent readings first
    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<MoodReading>>;
    fn create(&self, user_id: &str, new: NewMood) -> Result<MoodReading>;
}

pub trait HabitDirectory: Send + Sync {
    /// Active habits, longest streak first
    fn active(&self, user_id: &str, limit: usize) -> Result<Vec<Habit>>;
    fn create(&self, user_id: &str, new: NewHabit) -> Result<Habit>;
}

pub trait MediaDirectory: Send + Sync {
    /// Most recently tracked first
    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<MediaItem>>;
    fn create(&self, user_id: &str, new: NewMedia) -> Result<MediaItem>;
}

/// Filter for listing journal entries
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct EntryFilter {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

pub trait JournalDirectory: Send + Sync {
    /// Most recent entries first
    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<JournalEntry>>;
    fn list(&self, user_id: &str, filter: &EntryFilter) -> Result<Vec<JournalEntry>>;
    fn create(&self, user_id: &str, new: NewEntry) -> Result<JournalEntry>;
}

// =============================================================================
// IN-MEMORY IMPLEMENTATIONS
// =============================================================================

/// In-memory todo store keyed by user
#[derive(Default)]
pub struct InMemoryTodos {
    items: DashMap<String, Vec<Todo>>,
}

impl TodoDirectory for InMemoryTodos {
    fn upcoming(&self, user_id: &str, limit: usize) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .items
            .get(user_id)
            .map(|v| v.iter().filter(|t| !t.completed).cloned().collect())
            .unwrap_or_default();

        // Dated todos first (soonest due), undated last by creation order
        todos.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.created_at.cmp(&b.created_at),
        });
        todos.truncate(limit);
        Ok(todos)
    }

    fn create(&self, user_id: &str, new: NewTodo) -> Result<Todo> {
        let todo = Todo {
            id: Uuid::new_v4(),
            title: new.title,
            due_date: new.due_date,
            priority: new.priority,
            completed: false,
            created_at: Utc::now(),
        };
        self.items
            .entry(user_id.to_string())
            .or_default()
            .push(todo.clone());
        Ok(todo)
    }
}

/// In-memory mood log keyed by user
#[derive(Default)]
pub struct InMemoryMoods {
    items: DashMap<String, Vec<MoodReading>>,
}

impl MoodDirectory for InMemoryMoods {
    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<MoodReading>> {
        let mut moods: Vec<MoodReading> = self
            .items
            .get(user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default();
        moods.sort_by(|a, b| b.date.cmp(&a.date));
        moods.truncate(limit);
        Ok(moods)
    }

    fn create(&self, user_id: &str, new: NewMood) -> Result<MoodReading> {
        let reading = MoodReading {
            id: Uuid::new_v4(),
            mood: new.mood,
            energy: new.energy,
            date: Utc::now(),
        };
        self.items
            .entry(user_id.to_string())
            .or_default()
            .push(reading.clone());
        Ok(reading)
    }
}

/// In-memory habit book keyed by user
#[derive(Default)]
pub struct InMemoryHabits {
    items: DashMap<String, Vec<Habit>>,
}

impl HabitDirectory for InMemoryHabits {
    fn active(&self, user_id: &str, limit: usize) -> Result<Vec<Habit>> {
        let mut habits: Vec<Habit> = self
            .items
            .get(user_id)
            .map(|v| v.iter().filter(|h| h.active).cloned().collect())
            .unwrap_or_default();
        habits.sort_by(|a, b| b.streak.cmp(&a.streak));
        habits.truncate(limit);
        Ok(habits)
    }

    fn create(&self, user_id: &str, new: NewHabit) -> Result<Habit> {
        let habit = Habit {
            id: Uuid::new_v4(),
            name: new.name,
            frequency: new.frequency,
            streak: 0,
            active: true,
            created_at: Utc::now(),
        };
        self.items
            .entry(user_id.to_string())
            .or_default()
            .push(habit.clone());
        Ok(habit)
    }
}

/// In-memory media shelf keyed by user
#[derive(Default)]
pub struct InMemoryMedia {
    items: DashMap<String, Vec<MediaItem>>,
}

impl MediaDirectory for InMemoryMedia {
    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<MediaItem>> {
        let mut media: Vec<MediaItem> = self
            .items
            .get(user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default();
        media.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        media.truncate(limit);
        Ok(media)
    }

    fn create(&self, user_id: &str, new: NewMedia) -> Result<MediaItem> {
        let item = MediaItem {
            id: Uuid::new_v4(),
            title: new.title,
            media_type: new.media_type,
            status: new.status,
            created_at: Utc::now(),
        };
        self.items
            .entry(user_id.to_string())
            .or_default()
            .push(item.clone());
        Ok(item)
    }
}

/// In-memory journal store keyed by user
#[derive(Default)]
pub struct InMemoryJournal {
    items: DashMap<String, Vec<JournalEntry>>,
}

impl JournalDirectory for InMemoryJournal {
    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<JournalEntry>> {
        self.list(
            user_id,
            &EntryFilter {
                limit: Some(limit),
                ..EntryFilter::default()
            },
        )
    }

    fn list(&self, user_id: &str, filter: &EntryFilter) -> Result<Vec<JournalEntry>> {
        let mut entries: Vec<JournalEntry> = self
            .items
            .get(user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default();

        if let Some(from) = filter.from {
            entries.retain(|e| e.date >= from);
        }
        if let Some(to) = filter.to {
            entries.retain(|e| e.date <= to);
        }

        entries.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    fn create(&self, user_id: &str, new: NewEntry) -> Result<JournalEntry> {
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            content: new.content,
            date: new.date.unwrap_or_else(Utc::now),
            mood: new.mood,
            energy: new.energy,
        };
        self.items
            .entry(user_id.to_string())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{MoodLevel, TodoPriority};
    use chrono::Duration;

    #[test]
    fn test_upcoming_orders_by_due_date_and_skips_completed() {
        let store = InMemoryTodos::default();
        let soon = Utc::now() + Duration::hours(2);
        let later = Utc::now() + Duration::days(3);

        store
            .create(
                "alice",
                NewTodo {
                    title: "later".into(),
                    due_date: Some(later),
                    priority: TodoPriority::Medium,
                },
            )
            .unwrap();
        store
            .create(
                "alice",
                NewTodo {
                    title: "undated".into(),
                    due_date: None,
                    priority: TodoPriority::Low,
                },
            )
            .unwrap();
        store
            .create(
                "alice",
                NewTodo {
                    title: "soon".into(),
                    due_date: Some(soon),
                    priority: TodoPriority::High,
                },
            )
            .unwrap();

        let upcoming = store.upcoming("alice", 10).unwrap();
        let titles: Vec<&str> = upcoming.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["soon", "later", "undated"]);
    }

    #[test]
    fn test_journal_list_filters_by_date_range() {
        let store = InMemoryJournal::default();
        let old_date = Utc::now() - Duration::days(30);

        store
            .create(
                "alice",
                NewEntry {
                    content: "old entry".into(),
                    date: Some(old_date),
                    mood: None,
                    energy: None,
                },
            )
            .unwrap();
        store
            .create(
                "alice",
                NewEntry {
                    content: "new entry".into(),
                    date: None,
                    mood: None,
                    energy: None,
                },
            )
            .unwrap();

        let filter = EntryFilter {
            from: Some(Utc::now() - Duration::days(7)),
            ..EntryFilter::default()
        };
        let entries = store.list("alice", &filter).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "new entry");
    }

    #[test]
    fn test_stores_isolate_users() {
        let store = InMemoryMoods::default();
        store
            .create(
                "alice",
                NewMood {
                    mood: MoodLevel::Good,
                    energy: None,
                },
            )
            .unwrap();

        assert_eq!(store.recent("alice", 10).unwrap().len(), 1);
        assert!(store.recent("bob", 10).unwrap().is_empty());
    }
}
