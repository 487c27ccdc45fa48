/// Achievement badges
///
/// The catalog is fixed. A badge unlocks once per player, the first time a
/// completion satisfies its rule, and grants a one-off XP bonus.

use serde::{Deserialize, Serialize};

use crate::domain::HabitCadence;

/// Every badge a player can earn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstSteps,
    WeekWarrior,
    FortnightFocus,
    MonthlyMaster,
    WeeklyRegular,
    Centurion,
}

/// Facts about a completion that badge rules look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementContext {
    pub cadence: HabitCadence,
    /// Streak after this completion
    pub streak: u32,
    /// Completions across all habits, including this one
    pub lifetime_completions: u64,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstSteps,
        Achievement::WeekWarrior,
        Achievement::FortnightFocus,
        Achievement::MonthlyMaster,
        Achievement::WeeklyRegular,
        Achievement::Centurion,
    ];

    /// Stable key used in storage
    pub fn key(&self) -> &'static str {
        match self {
            Achievement::FirstSteps => "first_steps",
            Achievement::WeekWarrior => "week_warrior",
            Achievement::FortnightFocus => "fortnight_focus",
            Achievement::MonthlyMaster => "monthly_master",
            Achievement::WeeklyRegular => "weekly_regular",
            Achievement::Centurion => "centurion",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstSteps => "First Steps",
            Achievement::WeekWarrior => "Week Warrior",
            Achievement::FortnightFocus => "Fortnight Focus",
            Achievement::MonthlyMaster => "Monthly Master",
            Achievement::WeeklyRegular => "Weekly Regular",
            Achievement::Centurion => "Centurion",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstSteps => "Complete any habit for the first time",
            Achievement::WeekWarrior => "Reach a 7-day streak on a daily habit",
            Achievement::FortnightFocus => "Reach a 14-day streak on a daily habit",
            Achievement::MonthlyMaster => "Reach a 30-day streak on a daily habit",
            Achievement::WeeklyRegular => "Reach a 4-week streak on a weekly habit",
            Achievement::Centurion => "Log 100 completions across all habits",
        }
    }

    pub fn bonus_xp(&self) -> u32 {
        match self {
            Achievement::FirstSteps => 20,
            Achievement::WeekWarrior => 50,
            Achievement::FortnightFocus => 100,
            Achievement::MonthlyMaster => 250,
            Achievement::WeeklyRegular => 60,
            Achievement::Centurion => 300,
        }
    }

    /// Whether the rule for this badge holds
    pub fn is_earned(&self, ctx: &AchievementContext) -> bool {
        let daily = ctx.cadence == HabitCadence::Daily;
        match self {
            Achievement::FirstSteps => ctx.lifetime_completions >= 1,
            Achievement::WeekWarrior => daily && ctx.streak >= 7,
            Achievement::FortnightFocus => daily && ctx.streak >= 14,
            Achievement::MonthlyMaster => daily && ctx.streak >= 30,
            Achievement::WeeklyRegular => !daily && ctx.streak >= 4,
            Achievement::Centurion => ctx.lifetime_completions >= 100,
        }
    }
}

/// Badges earned by this completion that the player does not already hold
pub fn newly_unlocked(ctx: &AchievementContext, unlocked: &[Achievement]) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| !unlocked.contains(a) && a.is_earned(ctx))
        .collect()
}
