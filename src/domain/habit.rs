/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a user's habit
/// they want to track, along with its validation rules.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DifficultyTier, DomainError, HabitCadence, HabitId, StreakState};

/// A habit represents something the user wants to do regularly
///
/// Besides its identity and settings, a habit carries its streak state and
/// running totals so a completion can be scored from a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Daily or weekly
    pub cadence: HabitCadence,
    /// Decides base XP per completion
    pub difficulty: DifficultyTier,
    /// Current streak and last completion
    pub streak: StreakState,
    /// Best streak ever achieved for this habit
    pub longest_streak: u32,
    /// Total number of times this habit has been completed
    pub total_completions: u32,
    /// XP earned from this habit, excluding achievement bonuses
    pub total_xp_earned: u64,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Whether this habit is currently active (can be paused)
    pub is_active: bool,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// Unrecognized difficulty tiers are accepted; they earn medium XP.
    pub fn new(
        name: String,
        description: Option<String>,
        cadence: HabitCadence,
        difficulty: DifficultyTier,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;

        Ok(Self {
            id: HabitId::new(),
            name: name.trim().to_string(),
            description,
            cadence,
            difficulty,
            streak: StreakState::new(),
            longest_streak: 0,
            total_completions: 0,
            total_xp_earned: 0,
            created_at: Utc::now(),
            is_active: true,
        })
    }

    /// Update the habit's editable properties with validation
    ///
    /// Cadence is fixed at creation since the streak window depends on it.
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        difficulty: Option<DifficultyTier>,
        is_active: Option<bool>,
    ) -> Result<(), DomainError> {
        // Validate new values before applying them
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }

        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }

        if let Some(new_name) = name {
            self.name = new_name.trim().to_string();
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_difficulty) = difficulty {
            self.difficulty = new_difficulty;
        }
        if let Some(new_is_active) = is_active {
            self.is_active = new_is_active;
        }

        Ok(())
    }

    /// Record the outcome of a scored completion on this habit
    pub fn apply_completion(&mut self, streak: StreakState, xp_earned: u32) {
        self.longest_streak = self.longest_streak.max(streak.current_streak);
        self.streak = streak;
        self.total_completions = self.total_completions.saturating_add(1);
        self.total_xp_earned = self.total_xp_earned.saturating_add(xp_earned as u64);
    }

    // Validation helper methods

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    /// Validate optional description
    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.len() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
