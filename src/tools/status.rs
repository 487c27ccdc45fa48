/// Tool for checking habit status and streaks
///
/// This module implements the habit_status MCP tool.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{motivational_message, Completion, Habit, StreakOutcome};
use crate::engine::RewardEngine;
use crate::storage::{HabitStorage, StorageError};
use crate::tools::{parse_habit_id, pluralize};

/// Number of completions shown when recent history is requested
const RECENT_COMPLETIONS: u32 = 5;

/// Parameters for checking habit status
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StatusParams {
    /// Habit to inspect (omit for all active habits)
    pub habit_id: Option<String>,
    /// Include the most recent completions
    pub include_recent: Option<bool>,
}

/// One entry of a habit's completion history
#[derive(Debug, Serialize)]
pub struct RecentCompletion {
    pub completed_at: String,
    pub streak_after: u32,
    pub xp_awarded: u32,
    pub notes: Option<String>,
}

impl From<&Completion> for RecentCompletion {
    fn from(completion: &Completion) -> Self {
        Self {
            completed_at: completion.completed_at.format("%Y-%m-%d %H:%M").to_string(),
            streak_after: completion.streak_after,
            xp_awarded: completion.total_xp,
            notes: completion.has_notes().then(|| completion.notes.clone()).flatten(),
        }
    }
}

/// Information about a single habit's status
#[derive(Debug, Serialize)]
pub struct HabitStatus {
    pub habit_id: String,
    pub name: String,
    pub cadence: String,
    pub difficulty: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    pub total_xp_earned: u64,
    pub last_completed: Option<String>,
    /// "new", "done", "due", "broken" or "paused"
    pub status: String,
    /// XP the next completion would earn, when one is allowed now
    pub next_completion_xp: Option<u32>,
    pub recent_completions: Option<Vec<RecentCompletion>>,
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub habits: Vec<HabitStatus>,
    pub summary: String,
    pub message: String,
}

/// Classify a habit at `now` without changing anything
fn classify(engine: &RewardEngine, habit: &Habit, now: NaiveDateTime) -> &'static str {
    if !habit.is_active {
        return "paused";
    }

    let streaks = engine.streaks();
    let last = habit.streak.last_completed_at;
    if last.is_none() {
        return "new";
    }
    if streaks.already_completed(last, habit.cadence, now) {
        return "done";
    }

    match streaks.evaluate(habit.streak.current_streak, last, habit.cadence, now).outcome {
        StreakOutcome::Reset => "broken",
        _ => "due",
    }
}

/// Streak-adjusted XP of completing `habit` at `now`, excluding achievement bonuses
fn next_completion_xp(engine: &RewardEngine, habit: &Habit, status: &str, now: NaiveDateTime) -> Option<u32> {
    if status == "done" || status == "paused" {
        return None;
    }
    let streak = engine.streaks().evaluate(
        habit.streak.current_streak,
        habit.streak.last_completed_at,
        habit.cadence,
        now,
    );
    Some(engine.rewards().calculate(&habit.difficulty, streak.new_streak).total_xp)
}

/// Get status for habits using the provided storage
pub fn get_habit_status<S: HabitStorage>(
    storage: &S,
    engine: &RewardEngine,
    params: StatusParams,
    now: NaiveDateTime,
) -> Result<StatusResponse, StorageError> {
    let habits = match params.habit_id.as_deref() {
        Some(raw) => vec![storage.get_habit(&parse_habit_id(raw)?)?],
        None => storage.list_habits(true)?,
    };
    let include_recent = params.include_recent.unwrap_or(false);

    let mut statuses = Vec::with_capacity(habits.len());
    for habit in &habits {
        let status = classify(engine, habit, now);
        let recent_completions = if include_recent {
            let history = storage.get_completions_for_habit(&habit.id, Some(RECENT_COMPLETIONS))?;
            Some(history.iter().map(RecentCompletion::from).collect())
        } else {
            None
        };

        statuses.push(HabitStatus {
            habit_id: habit.id.to_string(),
            name: habit.name.clone(),
            cadence: habit.cadence.as_str().to_string(),
            difficulty: habit.difficulty.as_str().to_string(),
            current_streak: habit.streak.current_streak,
            longest_streak: habit.longest_streak,
            total_completions: habit.total_completions,
            total_xp_earned: habit.total_xp_earned,
            last_completed: habit
                .streak
                .last_completed_at
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string()),
            status: status.to_string(),
            next_completion_xp: next_completion_xp(engine, habit, status, now),
            recent_completions,
        });
    }

    let summary = if statuses.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let done = statuses.iter().filter(|s| s.status == "done").count();
        let due = statuses.iter().filter(|s| s.status == "due" || s.status == "new").count();
        let broken = statuses.iter().filter(|s| s.status == "broken").count();
        format!(
            "📊 Status: {} done, {} due, {} broken ({} habits)",
            done,
            due,
            broken,
            statuses.len()
        )
    };

    let details = habits
        .iter()
        .zip(&statuses)
        .map(|(habit, status)| {
            let unit = habit.cadence.period_name();
            let mut block = format!(
                "🎯 {} [{}]\n   Streak: {} | Best: {}\n   {}",
                habit.name,
                status.status,
                pluralize(status.current_streak, unit),
                pluralize(status.longest_streak, unit),
                motivational_message(status.current_streak, habit.cadence)
            );
            if let Some(last) = &status.last_completed {
                block.push_str(&format!("\n   Last completed: {}", last));
            }
            if let Some(xp) = status.next_completion_xp {
                block.push_str(&format!("\n   Next completion: +{} XP", xp));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let message = if details.is_empty() {
        summary.clone()
    } else {
        format!("{}\n\n{}", summary, details)
    };

    Ok(StatusResponse {
        habits: statuses,
        summary,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DifficultyTier, HabitCadence, HabitId, StreakState};
    use crate::storage::SqliteStorage;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn habit_with_last(last: Option<NaiveDateTime>) -> Habit {
        let mut habit = Habit::new("Read".to_string(), None, HabitCadence::Daily, DifficultyTier::Easy).unwrap();
        habit.streak = StreakState {
            current_streak: if last.is_some() { 4 } else { 0 },
            last_completed_at: last,
        };
        habit
    }

    #[test]
    fn test_classify() {
        let engine = RewardEngine::default();
        assert_eq!(classify(&engine, &habit_with_last(None), at(5, 9)), "new");
        assert_eq!(classify(&engine, &habit_with_last(Some(at(5, 7))), at(5, 9)), "done");
        assert_eq!(classify(&engine, &habit_with_last(Some(at(4, 7))), at(5, 9)), "due");
        assert_eq!(classify(&engine, &habit_with_last(Some(at(1, 7))), at(5, 9)), "broken");

        let mut paused = habit_with_last(None);
        paused.is_active = false;
        assert_eq!(classify(&engine, &paused, at(5, 9)), "paused");
    }

    #[test]
    fn test_status_for_all_habits() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.create_habit(&habit_with_last(None)).unwrap();
        storage.create_habit(&habit_with_last(None)).unwrap();

        let response = get_habit_status(
            &storage,
            &RewardEngine::default(),
            StatusParams { habit_id: None, include_recent: Some(true) },
            at(5, 9),
        )
        .unwrap();

        assert_eq!(response.habits.len(), 2);
        assert!(response.habits.iter().all(|h| h.status == "new"));
        assert!(response.habits[0].recent_completions.as_ref().unwrap().is_empty());
        assert!(response.summary.contains("2 due"));
        assert_eq!(response.habits[0].next_completion_xp, Some(10));
    }

    #[test]
    fn test_status_for_missing_habit() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let result = get_habit_status(
            &storage,
            &RewardEngine::default(),
            StatusParams { habit_id: Some(HabitId::new().to_string()), include_recent: None },
            at(5, 9),
        );
        assert!(matches!(result, Err(StorageError::HabitNotFound { .. })));
    }

    #[test]
    fn test_empty_status() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let response = get_habit_status(
            &storage,
            &RewardEngine::default(),
            StatusParams { habit_id: None, include_recent: None },
            at(5, 9),
        )
        .unwrap();
        assert!(response.habits.is_empty());
        assert!(response.message.contains("No habits found"));
    }
}
