/// Domain module containing the reward engine's rules and data types
///
/// This module defines the core entities (Habit, Completion, PlayerProfile)
/// and the three pure rule sets that score a completion: streak evaluation,
/// XP rewards, and level resolution.

pub mod achievement;
pub mod completion;
pub mod habit;
pub mod level;
pub mod profile;
pub mod reward;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use achievement::*;
pub use completion::*;
pub use habit::*;
pub use level::*;
pub use profile::*;
pub use reward::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid cadence: {0}")]
    InvalidCadence(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("Habit '{habit_name}' was already completed this {period}")]
    AlreadyCompleted { habit_name: String, period: String },

    #[error("Habit '{0}' is paused")]
    HabitPaused(String),
}
