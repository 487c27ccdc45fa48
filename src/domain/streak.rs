/// Streak evaluation
///
/// This module decides, for a single completion, whether a habit's streak
/// starts, continues, resets, or stays unchanged. The rules depend on the
/// habit's cadence and on a grace period after the strict cadence boundary.

use serde::{Deserialize, Serialize};
use chrono::{Days, Duration, NaiveDateTime, NaiveTime};

use crate::config::StreakConfig;
use crate::domain::HabitCadence;

/// Persisted streak data for one habit
///
/// `last_completed_at` is `None` exactly when `current_streak` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    /// Current consecutive days/weeks completed
    pub current_streak: u32,
    /// When the habit was last completed (None if never completed)
    pub last_completed_at: Option<NaiveDateTime>,
}

impl StreakState {
    /// Create an empty streak for a habit that was never completed
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the state that follows a completion at `now`
    ///
    /// An unchanged evaluation keeps the previous state so a redundant call
    /// does not move the cadence window.
    pub fn advance(&self, evaluation: &StreakEvaluation, now: NaiveDateTime) -> StreakState {
        if evaluation.outcome == StreakOutcome::Unchanged {
            return self.clone();
        }
        StreakState {
            current_streak: evaluation.new_streak,
            last_completed_at: Some(now),
        }
    }
}

/// What happened to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakOutcome {
    /// First completion ever
    Started,
    /// Completed in the next window (or within grace)
    Continued,
    /// The gap was too long; a previous streak was discarded
    Reset,
    /// Already completed in the current window
    Unchanged,
}

/// Result of evaluating one completion against the previous streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakEvaluation {
    pub new_streak: u32,
    /// A prior non-zero streak was discarded
    pub streak_broken: bool,
    /// The resulting streak is 1 after a first completion or a reset
    pub is_new_streak: bool,
    pub outcome: StreakOutcome,
}

impl StreakEvaluation {
    fn started() -> Self {
        Self {
            new_streak: 1,
            streak_broken: false,
            is_new_streak: true,
            outcome: StreakOutcome::Started,
        }
    }

    fn continued(current_streak: u32) -> Self {
        let new_streak = current_streak.saturating_add(1);
        Self {
            new_streak,
            streak_broken: false,
            is_new_streak: new_streak == 1,
            outcome: StreakOutcome::Continued,
        }
    }

    fn reset() -> Self {
        Self {
            new_streak: 1,
            streak_broken: true,
            is_new_streak: true,
            outcome: StreakOutcome::Reset,
        }
    }

    fn unchanged(current_streak: u32) -> Self {
        Self {
            new_streak: current_streak.max(1),
            streak_broken: false,
            is_new_streak: false,
            outcome: StreakOutcome::Unchanged,
        }
    }
}

/// Streak rules for daily and weekly habits
///
/// Daily "same day" and "yesterday" checks compare calendar dates. Only the
/// daily grace window and the weekly day count are duration based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakEvaluator {
    grace_period_hours: u32,
    weekly_window_days: u32,
    weekly_grace_days: u32,
}

impl Default for StreakEvaluator {
    fn default() -> Self {
        Self::from_config(&StreakConfig::default())
    }
}

impl StreakEvaluator {
    pub fn new(grace_period_hours: u32, weekly_window_days: u32, weekly_grace_days: u32) -> Self {
        Self {
            grace_period_hours,
            weekly_window_days: weekly_window_days.max(1),
            weekly_grace_days,
        }
    }

    pub fn from_config(config: &StreakConfig) -> Self {
        Self::new(
            config.grace_period_hours,
            config.weekly_window_days,
            config.weekly_grace_days,
        )
    }

    /// Decide the streak after a completion at `now`
    ///
    /// Callers must ensure `now >= last_completed_at`.
    pub fn evaluate(
        &self,
        current_streak: u32,
        last_completed_at: Option<NaiveDateTime>,
        cadence: HabitCadence,
        now: NaiveDateTime,
    ) -> StreakEvaluation {
        let Some(last) = last_completed_at else {
            return StreakEvaluation::started();
        };

        match cadence {
            HabitCadence::Daily => self.evaluate_daily(current_streak, last, now),
            HabitCadence::Weekly => self.evaluate_weekly(current_streak, last, now),
        }
    }

    /// Whether a completion at `now` falls in the same cadence window as the last one
    pub fn already_completed(
        &self,
        last_completed_at: Option<NaiveDateTime>,
        cadence: HabitCadence,
        now: NaiveDateTime,
    ) -> bool {
        let Some(last) = last_completed_at else {
            return false;
        };

        match cadence {
            HabitCadence::Daily => last.date() == now.date(),
            HabitCadence::Weekly => Self::days_elapsed(last, now) < self.weekly_window_days as i64,
        }
    }

    fn evaluate_daily(
        &self,
        current_streak: u32,
        last: NaiveDateTime,
        now: NaiveDateTime,
    ) -> StreakEvaluation {
        let last_day = last.date();
        let today = now.date();

        if last_day == today {
            return StreakEvaluation::unchanged(current_streak);
        }

        if last_day.succ_opt() == Some(today) {
            return StreakEvaluation::continued(current_streak);
        }

        // The day after `last_day` ends at midnight of last_day + 2
        let grace_deadline = last_day
            .checked_add_days(Days::new(2))
            .map(|day| day.and_time(NaiveTime::MIN) + Duration::hours(self.grace_period_hours as i64));

        match grace_deadline {
            Some(deadline) if now <= deadline => StreakEvaluation::continued(current_streak),
            _ => StreakEvaluation::reset(),
        }
    }

    fn evaluate_weekly(
        &self,
        current_streak: u32,
        last: NaiveDateTime,
        now: NaiveDateTime,
    ) -> StreakEvaluation {
        let days = Self::days_elapsed(last, now);
        let window = self.weekly_window_days as i64;
        let grace = self.weekly_grace_days as i64;

        if days < window {
            StreakEvaluation::unchanged(current_streak)
        } else if days <= window + grace {
            StreakEvaluation::continued(current_streak)
        } else {
            StreakEvaluation::reset()
        }
    }

    /// Whole days between two instants, rounded down
    fn days_elapsed(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
        (to - from).num_days()
    }
}

/// Get a motivational message based on current streak status
pub fn motivational_message(current_streak: u32, cadence: HabitCadence) -> String {
    let unit = cadence.period_name();
    match current_streak {
        0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
        1 => format!("Great start! One {} down, keep the momentum going.", unit),
        2..=6 => format!("Nice work! {} {}s in a row. You're building a strong habit.", current_streak, unit),
        7..=13 => format!("Excellent! {} {}s strong. You're in the groove now!", current_streak, unit),
        14..=29 => format!("Amazing! {} {}s straight. This is becoming second nature.", current_streak, unit),
        30..=99 => format!("Incredible! {} {}s of consistency. You're a habit master!", current_streak, unit),
        _ => format!("Legendary! {} {}s of unwavering commitment. You're an inspiration!", current_streak, unit),
    }
}
