//! Life-tracking domain: record types and store collaborators
//!
//! The core pipeline never owns durable persistence; it talks to the domain
//! stores through the traits in [`stores`]. The in-memory implementations
//! back the server process and tests.

pub mod stores;
pub mod types;

pub use stores::{
    EntryFilter, HabitDirectory, InMemoryHabits, InMemoryJournal, InMemoryMedia, InMemoryMoods,
    InMemoryTodos, JournalDirectory, MediaDirectory, MoodDirectory, TodoDirectory,
};
pub use types::{
    EnergyLevel, Habit, HabitFrequency, JournalEntry, MediaItem, MediaStatus, MediaType,
    MoodLevel, MoodReading, NewEntry, NewHabit, NewMedia, NewMood, NewTodo, Todo, TodoPriority,
};
