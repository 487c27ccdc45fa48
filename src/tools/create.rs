/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::domain::{DifficultyTier, Habit, HabitCadence};
use crate::storage::{StorageError, HabitStorage};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// How often: "daily" or "weekly"
    pub cadence: String,
    /// "easy", "medium" or "hard" (defaults to medium)
    pub difficulty: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: Option<String>,
    pub message: String,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: HabitStorage>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, StorageError> {
    let cadence = HabitCadence::parse(&params.cadence)?;

    let difficulty = params
        .difficulty
        .as_deref()
        .map(DifficultyTier::parse)
        .unwrap_or_default();

    let mut message = String::new();
    if !difficulty.is_recognized() {
        tracing::warn!("Creating habit with unrecognized difficulty '{}'", difficulty.as_str());
        message.push_str(&format!(
            "⚠️ Unknown difficulty '{}', it will earn medium XP.\n",
            difficulty.as_str()
        ));
    }

    let habit = Habit::new(params.name, params.description, cadence, difficulty)?;
    storage.create_habit(&habit)?;

    message.push_str(&format!(
        "✅ Created {} habit '{}' ({})! Ready to start your streak!",
        habit.cadence.as_str(),
        habit.name,
        habit.difficulty.as_str()
    ));

    Ok(CreateHabitResponse {
        success: true,
        habit_id: Some(habit.id.to_string()),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, HabitId};
    use crate::storage::SqliteStorage;

    fn params(name: &str, cadence: &str, difficulty: Option<&str>) -> CreateHabitParams {
        CreateHabitParams {
            name: name.to_string(),
            description: None,
            cadence: cadence.to_string(),
            difficulty: difficulty.map(str::to_string),
        }
    }

    #[test]
    fn test_create_defaults_to_medium() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let response = create_habit(&storage, params("Walk", "daily", None)).unwrap();

        let id = HabitId::from_string(&response.habit_id.unwrap()).unwrap();
        let habit = storage.get_habit(&id).unwrap();
        assert_eq!(habit.difficulty, DifficultyTier::Medium);
    }

    #[test]
    fn test_create_with_unknown_difficulty_warns() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let response = create_habit(&storage, params("Climb", "weekly", Some("extreme"))).unwrap();
        assert!(response.message.contains("medium XP"));
    }

    #[test]
    fn test_create_rejects_bad_cadence() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let result = create_habit(&storage, params("Walk", "hourly", None));
        assert!(matches!(result, Err(StorageError::Domain(DomainError::InvalidCadence(_)))));
    }
}
