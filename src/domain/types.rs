//! Domain record types shared across the pipeline and the HTTP surface
//!
//! All wire-facing structs serialize camelCase to match the client contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TODOS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    High,
    #[default]
    Medium,
    Low,
}

/// A pending task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: TodoPriority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Creation request forwarded to the todo store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: TodoPriority,
}

// =============================================================================
// MOODS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLevel {
    Great,
    Good,
    Okay,
    Low,
    Awful,
}

impl MoodLevel {
    /// Parse from string (case-insensitive), tolerating common synonyms the
    /// engine emits
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "great" | "excellent" | "amazing" => Some(Self::Great),
            "good" | "happy" | "positive" => Some(Self::Good),
            "okay" | "ok" | "neutral" | "fine" => Some(Self::Okay),
            "low" | "sad" | "down" => Some(Self::Low),
            "awful" | "terrible" | "bad" => Some(Self::Awful),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    High,
    Medium,
    Low,
}

/// A single mood reading
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodReading {
    pub id: Uuid,
    pub mood: MoodLevel,
    #[serde(default)]
    pub energy: Option<EnergyLevel>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMood {
    pub mood: MoodLevel,
    #[serde(default)]
    pub energy: Option<EnergyLevel>,
}

// =============================================================================
// HABITS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl HabitFrequency {
    /// Parse from string (case-insensitive)
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "everyday" => Some(Self::Daily),
            "weekly" | "week" => Some(Self::Weekly),
            "monthly" | "month" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// A tracked habit with its current streak
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub frequency: HabitFrequency,
    #[serde(default)]
    pub streak: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub frequency: HabitFrequency,
}

// =============================================================================
// MEDIA
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Book,
    Movie,
    Show,
    Podcast,
    Game,
    #[default]
    Other,
}

impl MediaType {
    /// Parse from string (case-insensitive)
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "book" | "novel" => Some(Self::Book),
            "movie" | "film" => Some(Self::Movie),
            "show" | "series" | "tv" => Some(Self::Show),
            "podcast" => Some(Self::Podcast),
            "game" | "videogame" => Some(Self::Game),
            "" => None,
            _ => Some(Self::Other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Dropped,
}

/// A tracked media item (book, movie, show, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub status: MediaStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedia {
    pub title: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub status: MediaStatus,
}

// =============================================================================
// JOURNAL ENTRIES
// =============================================================================

/// A journal entry. Immutable once analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub mood: Option<MoodLevel>,
    #[serde(default)]
    pub energy: Option<EnergyLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub content: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mood: Option<MoodLevel>,
    #[serde(default)]
    pub energy: Option<EnergyLevel>,
}
