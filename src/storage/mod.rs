/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits, completions, the
/// player profile, and unlocked achievements.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDateTime;
use thiserror::Error;
use crate::domain::{Achievement, Completion, DomainError, Habit, HabitId, PlayerProfile};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Habit {habit_id} was completed concurrently; retry the completion")]
    StaleCompletion { habit_id: String },

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Trait defining the storage interface for habits
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface.
pub trait HabitStorage {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update an existing habit's settings (name, description, difficulty, active flag)
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit (soft delete - mark as inactive)
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habits, optionally only active ones
    fn list_habits(&self, active_only: bool) -> Result<Vec<Habit>, StorageError>;

    /// Get completions for a specific habit, newest first
    fn get_completions_for_habit(
        &self,
        habit_id: &HabitId,
        limit: Option<u32>,
    ) -> Result<Vec<Completion>, StorageError>;

    /// Get the player profile (a fresh one if none was stored yet)
    fn get_profile(&self) -> Result<PlayerProfile, StorageError>;

    /// Get unlocked achievements in unlock order
    fn get_unlocked_achievements(&self) -> Result<Vec<Achievement>, StorageError>;

    /// Persist a scored completion atomically
    ///
    /// `expected_last_completed_at` is the habit's `last_completed_at` as it
    /// was read before scoring. If the stored value differs, another
    /// completion won the race and nothing is written.
    fn record_completion(
        &self,
        expected_last_completed_at: Option<NaiveDateTime>,
        habit: &Habit,
        completion: &Completion,
        profile: &PlayerProfile,
        achievements: &[Achievement],
    ) -> Result<(), StorageError>;
}
