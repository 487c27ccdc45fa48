/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool to modify
/// a habit's name, description, difficulty or active flag.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::DifficultyTier;
use crate::storage::{HabitStorage, StorageError};
use crate::tools::parse_habit_id;

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    pub name: Option<String>,
    /// New description (an empty string clears it)
    pub description: Option<String>,
    /// "easy", "medium" or "hard"
    pub difficulty: Option<String>,
    /// false pauses the habit, true resumes it
    pub is_active: Option<bool>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = storage.get_habit(&habit_id)?;

    let difficulty = params.difficulty.as_deref().map(DifficultyTier::parse);
    let unknown_difficulty = difficulty
        .as_ref()
        .filter(|d| !d.is_recognized())
        .map(|d| d.as_str().to_string());

    let description = params
        .description
        .map(|d| if d.trim().is_empty() { None } else { Some(d) });

    habit.update(params.name, description, difficulty, params.is_active)?;
    storage.update_habit(&habit)?;

    let mut message = match params.is_active {
        Some(false) => format!("⏸️ Paused habit '{}'", habit.name),
        Some(true) => format!("▶️ Reactivated habit '{}'", habit.name),
        None => format!("✅ Updated habit '{}'", habit.name),
    };
    if let Some(tier) = unknown_difficulty {
        tracing::warn!("Habit '{}' updated with unrecognized difficulty '{}'", habit.name, tier);
        message.push_str(&format!("\n⚠️ Unknown difficulty '{}', it will earn medium XP.", tier));
    }

    Ok(UpdateHabitResponse {
        success: true,
        message,
    })
}
