/// Completion records
///
/// Each time a user completes a habit we store one Completion with the XP
/// breakdown it earned, so history can be shown without recomputing rewards.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDateTime, Utc};
use crate::domain::{CompletionId, DomainError, HabitId, RewardResult};

/// A record of completing a habit once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Unique identifier for this completion
    pub id: CompletionId,
    /// Which habit this completion is for
    pub habit_id: HabitId,
    /// When this completion was logged
    pub logged_at: DateTime<Utc>,
    /// Local time the habit was completed (drives streak windows)
    pub completed_at: NaiveDateTime,
    /// Streak after this completion
    pub streak_after: u32,
    pub base_xp: u32,
    pub streak_bonus: u32,
    /// XP from achievements unlocked by this completion
    pub achievement_xp: u32,
    /// Everything granted by this completion
    pub total_xp: u32,
    /// User's notes about this completion
    pub notes: Option<String>,
}

impl Completion {
    /// Create a completion record from a scored reward
    pub fn new(
        habit_id: HabitId,
        completed_at: NaiveDateTime,
        streak_after: u32,
        reward: &RewardResult,
        achievement_xp: u32,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_notes(&notes)?;

        Ok(Self {
            id: CompletionId::new(),
            habit_id,
            logged_at: Utc::now(),
            completed_at,
            streak_after,
            base_xp: reward.base_xp,
            streak_bonus: reward.streak_bonus,
            achievement_xp,
            total_xp: reward.total_xp.saturating_add(achievement_xp),
            notes,
        })
    }

    /// Check if this completion has notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Validate the optional notes field
    pub fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.len() > 500 {
                return Err(DomainError::InvalidValue {
                    message: "Notes cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
