/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Habit};
use crate::storage::{HabitStorage, StorageError};

/// Parameters for listing habits
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Only list active habits (default true)
    pub active_only: Option<bool>,
    /// "name", "streak", "xp" or "completions" (default newest first)
    pub sort_by: Option<String>,
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub name: String,
    pub cadence: String,
    pub difficulty: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    pub total_xp_earned: u64,
    pub is_active: bool,
}

impl From<Habit> for HabitSummary {
    fn from(habit: Habit) -> Self {
        Self {
            habit_id: habit.id.to_string(),
            cadence: habit.cadence.as_str().to_string(),
            difficulty: habit.difficulty.as_str().to_string(),
            current_streak: habit.streak.current_streak,
            longest_streak: habit.longest_streak,
            total_completions: habit.total_completions,
            total_xp_earned: habit.total_xp_earned,
            is_active: habit.is_active,
            name: habit.name,
        }
    }
}

/// Summary statistics for all habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub active_habits: u32,
    pub total_completions: u64,
    pub best_current_streak: u32,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub summary: HabitListSummary,
}

/// Sort orders accepted by habit_list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortBy {
    Newest,
    Name,
    Streak,
    Xp,
    Completions,
}

impl SortBy {
    fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        let Some(raw) = raw else {
            return Ok(SortBy::Newest);
        };
        match raw.trim().to_lowercase().as_str() {
            "" | "created_at" | "newest" => Ok(SortBy::Newest),
            "name" => Ok(SortBy::Name),
            "streak" => Ok(SortBy::Streak),
            "xp" => Ok(SortBy::Xp),
            "completions" => Ok(SortBy::Completions),
            other => Err(DomainError::InvalidValue {
                message: format!(
                    "Invalid sort_by '{}'. Valid options: name, streak, xp, completions",
                    other
                ),
            }),
        }
    }
}

/// List habits using the provided storage
pub fn list_habits<S: HabitStorage>(
    storage: &S,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, StorageError> {
    let sort_by = SortBy::parse(params.sort_by.as_deref())?;
    let active_only = params.active_only.unwrap_or(true);

    // Storage returns newest first; stable sorts keep that as the tiebreak
    let mut habits = storage.list_habits(active_only)?;
    match sort_by {
        SortBy::Newest => {}
        SortBy::Name => habits.sort_by_key(|h| h.name.to_lowercase()),
        SortBy::Streak => habits.sort_by(|a, b| b.streak.current_streak.cmp(&a.streak.current_streak)),
        SortBy::Xp => habits.sort_by(|a, b| b.total_xp_earned.cmp(&a.total_xp_earned)),
        SortBy::Completions => habits.sort_by(|a, b| b.total_completions.cmp(&a.total_completions)),
    }

    let habit_summaries: Vec<HabitSummary> = habits.into_iter().map(HabitSummary::from).collect();

    let summary = HabitListSummary {
        total_habits: habit_summaries.len() as u32,
        active_habits: habit_summaries.iter().filter(|h| h.is_active).count() as u32,
        total_completions: habit_summaries.iter().map(|h| h.total_completions as u64).sum(),
        best_current_streak: habit_summaries.iter().map(|h| h.current_streak).max().unwrap_or(0),
    };

    Ok(ListHabitsResponse {
        habits: habit_summaries,
        summary,
    })
}
