/// Tool for completing habits
///
/// This module implements the habit_complete MCP tool. It reads the habit,
/// profile and unlocked achievements, scores the completion with the reward
/// engine, and writes everything back in one transaction.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{level_title, DomainError, StreakOutcome};
use crate::engine::{CompletionOutcome, RewardEngine};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::{parse_habit_id, pluralize};

/// Parameters for completing a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompleteHabitParams {
    /// ID of the habit to complete
    pub habit_id: String,
    /// Local completion time (YYYY-MM-DDTHH:MM:SS, optional - defaults to now)
    pub completed_at: Option<String>,
    /// Optional notes about this completion
    pub notes: Option<String>,
}

/// Response from completing a habit
#[derive(Debug, Serialize)]
pub struct CompleteHabitResponse {
    pub success: bool,
    pub message: String,
    pub habit_id: String,
    pub current_streak: u32,
    pub streak_broken: bool,
    pub is_new_streak: bool,
    pub base_xp: u32,
    pub streak_multiplier: f64,
    pub streak_bonus: u32,
    pub achievement_xp: u32,
    pub xp_awarded: u32,
    pub achievements: Vec<String>,
    pub level: u32,
    pub previous_level: u32,
    pub leveled_up: bool,
    pub xp_within_level: u32,
    pub xp_required_for_next_level: u32,
}

/// Parse a completion time argument
fn parse_completed_at(raw: &str) -> Result<NaiveDateTime, DomainError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| {
            DomainError::InvalidDate(format!(
                "Invalid completion time '{}', expected YYYY-MM-DDTHH:MM:SS",
                raw
            ))
        })
}

/// Complete a habit at `now` (or at the given `completed_at`) and award XP
pub fn complete_habit<S: HabitStorage>(
    storage: &S,
    engine: &RewardEngine,
    params: CompleteHabitParams,
    now: NaiveDateTime,
) -> Result<CompleteHabitResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    let completed_at = match params.completed_at.as_deref() {
        Some(raw) => {
            let when = parse_completed_at(raw)?;
            if when > now {
                return Err(DomainError::InvalidDate(
                    "Cannot complete habits in the future".to_string(),
                )
                .into());
            }
            when
        }
        None => now,
    };

    let habit = storage.get_habit(&habit_id)?;
    let profile = storage.get_profile()?;
    let unlocked = storage.get_unlocked_achievements()?;

    let previous_streak = habit.streak.current_streak;
    let outcome = engine.score_completion(&habit, &profile, &unlocked, completed_at, params.notes)?;

    storage.record_completion(
        habit.streak.last_completed_at,
        &outcome.habit,
        &outcome.completion,
        &outcome.profile,
        &outcome.achievements,
    )?;

    tracing::info!(
        "Completed habit '{}': streak {}, +{} XP, level {}",
        outcome.habit.name,
        outcome.streak.new_streak,
        outcome.xp_gained(),
        outcome.level.level
    );

    Ok(build_response(&outcome, previous_streak))
}

fn build_response(outcome: &CompletionOutcome, previous_streak: u32) -> CompleteHabitResponse {
    let habit = &outcome.habit;
    let unit = habit.cadence.period_name();
    let mut lines = Vec::new();

    lines.push(format!(
        "🔥 Completed '{}'! Current streak: {}",
        habit.name,
        pluralize(outcome.streak.new_streak, unit)
    ));

    if outcome.streak.streak_broken {
        lines.push(format!(
            "💔 Your previous streak of {} was broken. Starting fresh!",
            pluralize(previous_streak, unit)
        ));
    } else if outcome.streak.outcome == StreakOutcome::Started {
        lines.push("🌱 First completion, your streak begins today.".to_string());
    }

    let reward = &outcome.reward;
    if reward.streak_bonus > 0 {
        lines.push(format!(
            "✨ +{} XP ({} base + {} streak bonus, x{:.1})",
            reward.total_xp, reward.base_xp, reward.streak_bonus, reward.streak_multiplier
        ));
    } else {
        lines.push(format!("✨ +{} XP", reward.total_xp));
    }

    for achievement in &outcome.achievements {
        lines.push(format!(
            "🏅 Achievement unlocked: {} (+{} XP)",
            achievement.title(),
            achievement.bonus_xp()
        ));
    }

    let level = &outcome.level;
    if level.leveled_up {
        lines.push(format!(
            "⬆️ Level up! {} → {} ({})",
            level.previous_level,
            level.level,
            level_title(level.level)
        ));
    }
    lines.push(format!(
        "📊 Level {}: {}/{} XP ({}%)",
        level.level,
        level.xp_within_level,
        level.xp_required_for_next_level,
        level.state().progress_percent()
    ));

    CompleteHabitResponse {
        success: true,
        message: lines.join("\n"),
        habit_id: habit.id.to_string(),
        current_streak: outcome.streak.new_streak,
        streak_broken: outcome.streak.streak_broken,
        is_new_streak: outcome.streak.is_new_streak,
        base_xp: reward.base_xp,
        streak_multiplier: reward.streak_multiplier,
        streak_bonus: reward.streak_bonus,
        achievement_xp: outcome.completion.achievement_xp,
        xp_awarded: outcome.xp_gained(),
        achievements: outcome.achievements.iter().map(|a| a.title().to_string()).collect(),
        level: level.level,
        previous_level: level.previous_level,
        leveled_up: level.leveled_up,
        xp_within_level: level.xp_within_level,
        xp_required_for_next_level: level.xp_required_for_next_level,
    }
}
