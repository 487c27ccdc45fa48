/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental types like HabitCadence, DifficultyTier
/// and the ID types used by Habit, Completion, and other domain entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a habit ID where a completion ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a single completion record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionId(pub Uuid);

impl CompletionId {
    /// Generate a new random completion ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a completion ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for CompletionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CompletionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How often a habit is expected to be completed
///
/// The cadence decides which calendar window counts as "still within streak".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitCadence {
    /// Once per calendar day
    Daily,
    /// Once per seven-day window
    Weekly,
}

impl HabitCadence {
    /// Parse a cadence from user input ("daily" / "weekly")
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(HabitCadence::Daily),
            "weekly" => Ok(HabitCadence::Weekly),
            other => Err(DomainError::InvalidCadence(format!(
                "Invalid cadence '{}'. Valid options: daily, weekly",
                other
            ))),
        }
    }

    /// Storage / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCadence::Daily => "daily",
            HabitCadence::Weekly => "weekly",
        }
    }

    /// Unit used when talking about streak length ("day" / "week")
    pub fn period_name(&self) -> &'static str {
        match self {
            HabitCadence::Daily => "day",
            HabitCadence::Weekly => "week",
        }
    }
}

/// How hard a habit is, which decides its base XP
///
/// Tiers outside easy/medium/hard are kept verbatim in `Other` so they can be
/// stored and shown back to the user. They are priced like `Medium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    /// Unrecognized tier name
    Other(String),
}

impl DifficultyTier {
    /// Parse a difficulty from user input
    ///
    /// This never fails: unknown names become `Other` and earn medium XP.
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "easy" => DifficultyTier::Easy,
            "medium" => DifficultyTier::Medium,
            "hard" => DifficultyTier::Hard,
            _ => DifficultyTier::Other(normalized),
        }
    }

    /// Storage / display representation
    pub fn as_str(&self) -> &str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
            DifficultyTier::Other(name) => name,
        }
    }

    /// Whether this tier is one of the three known tiers
    pub fn is_recognized(&self) -> bool {
        !matches!(self, DifficultyTier::Other(_))
    }
}

impl Default for DifficultyTier {
    fn default() -> Self {
        DifficultyTier::Medium
    }
}
