/// XP rewards for a single completion
///
/// Base XP comes from the habit's difficulty tier. Longer streaks multiply it
/// in fixed steps up to a ceiling.

use serde::{Deserialize, Serialize};

use crate::config::RewardTableConfig;
use crate::domain::DifficultyTier;

/// XP earned by one completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardResult {
    pub total_xp: u32,
    pub base_xp: u32,
    pub streak_multiplier: f64,
    /// `total_xp - base_xp`, never negative
    pub streak_bonus: u32,
}

/// Difficulty table plus the streak multiplier step function
///
/// The multiplier is held in integer percent so every step is exact and the
/// final rounding is a plain half-up integer division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardCalculator {
    easy_xp: u32,
    medium_xp: u32,
    hard_xp: u32,
    step_days: u32,
    step_percent: u32,
    max_percent: u32,
}

impl Default for RewardCalculator {
    fn default() -> Self {
        Self::from_config(&RewardTableConfig::default())
    }
}

impl RewardCalculator {
    pub fn from_config(config: &RewardTableConfig) -> Self {
        Self {
            easy_xp: config.easy_xp,
            medium_xp: config.medium_xp,
            hard_xp: config.hard_xp,
            step_days: config.multiplier_step_days.max(1),
            step_percent: config.multiplier_step_percent,
            max_percent: config.max_multiplier_percent.max(100),
        }
    }

    /// Reward for completing a habit of `difficulty` with the already-advanced `streak`
    pub fn calculate(&self, difficulty: &DifficultyTier, streak: u32) -> RewardResult {
        let base_xp = self.base_xp(difficulty);
        let percent = self.multiplier_percent(streak);

        // round half up: (base * pct + 50) / 100
        let scaled = base_xp as u64 * percent as u64 + 50;
        let total_xp = u32::try_from(scaled / 100).unwrap_or(u32::MAX);

        RewardResult {
            total_xp,
            base_xp,
            streak_multiplier: percent as f64 / 100.0,
            streak_bonus: total_xp.saturating_sub(base_xp),
        }
    }

    /// Base XP for a difficulty tier
    ///
    /// Unrecognized tiers earn medium XP instead of failing.
    pub fn base_xp(&self, difficulty: &DifficultyTier) -> u32 {
        match difficulty {
            DifficultyTier::Easy => self.easy_xp,
            DifficultyTier::Medium => self.medium_xp,
            DifficultyTier::Hard => self.hard_xp,
            DifficultyTier::Other(name) => {
                tracing::warn!("Unrecognized difficulty '{}', using medium base XP", name);
                self.medium_xp
            }
        }
    }

    /// Streak multiplier as a ratio (1.0, 1.1, ... up to the ceiling)
    pub fn multiplier_for_streak(&self, streak: u32) -> f64 {
        self.multiplier_percent(streak) as f64 / 100.0
    }

    fn multiplier_percent(&self, streak: u32) -> u32 {
        let steps = (streak / self.step_days) as u64;
        let percent = 100u64 + steps * self.step_percent as u64;
        percent.min(self.max_percent as u64) as u32
    }
}
