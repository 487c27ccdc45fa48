/// Levels derived from accumulated XP
///
/// Each level costs a fixed, strictly increasing amount of XP. A player's
/// progress is the pair (level, XP earned inside that level).

use serde::{Deserialize, Serialize};

use crate::config::LevelConfig;

/// Where a player stands inside the level curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub level: u32,
    pub xp_within_level: u32,
    pub xp_required_for_next_level: u32,
}

impl LevelState {
    /// Percentage of the current level completed (0-99)
    pub fn progress_percent(&self) -> u32 {
        ((self.xp_within_level as u64 * 100) / self.xp_required_for_next_level.max(1) as u64) as u32
    }
}

/// Result of adding XP to an existing (level, xp) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub xp_within_level: u32,
    pub xp_required_for_next_level: u32,
    pub leveled_up: bool,
    pub previous_level: u32,
}

impl LevelProgress {
    pub fn state(&self) -> LevelState {
        LevelState {
            level: self.level,
            xp_within_level: self.xp_within_level,
            xp_required_for_next_level: self.xp_required_for_next_level,
        }
    }

    /// How many levels were gained
    pub fn levels_gained(&self) -> u32 {
        self.level.saturating_sub(self.previous_level)
    }
}

/// The level curve: `xp_for_level(n) = floor(base * n * growth)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelResolver {
    base_xp_per_level: u32,
    growth_multiplier: f64,
}

impl Default for LevelResolver {
    fn default() -> Self {
        Self::from_config(&LevelConfig::default())
    }
}

impl LevelResolver {
    pub fn new(base_xp_per_level: u32, growth_multiplier: f64) -> Self {
        Self {
            base_xp_per_level,
            growth_multiplier,
        }
    }

    pub fn from_config(config: &LevelConfig) -> Self {
        Self::new(config.base_xp_per_level, config.growth_multiplier)
    }

    /// XP needed to go from `level` to `level + 1`
    ///
    /// Level 0 is treated as level 1. The result is at least 1.
    pub fn xp_for_level(&self, level: u32) -> u32 {
        let level = level.max(1);
        let raw = self.base_xp_per_level as f64 * level as f64 * self.growth_multiplier;

        // 100 * 3 * 1.2 lands a hair off 360 in binary floating point
        let nearest = raw.round();
        let xp = if (raw - nearest).abs() <= 1e-9 * raw.abs().max(1.0) {
            nearest
        } else {
            raw.floor()
        };

        (xp as u64).clamp(1, u32::MAX as u64) as u32
    }

    /// Total XP needed to reach the start of `level` from zero
    pub fn total_xp_for_level(&self, level: u32) -> u64 {
        (1..level.max(1)).map(|l| self.xp_for_level(l) as u64).sum()
    }

    /// Resolve level and in-level XP from lifetime XP
    pub fn level_from_total_xp(&self, total_xp: u64) -> LevelState {
        let (level, remaining) = self.normalize(1, total_xp);
        LevelState {
            level,
            xp_within_level: remaining,
            xp_required_for_next_level: self.xp_for_level(level),
        }
    }

    /// Add (or remove) XP from a running (level, xp) pair
    ///
    /// Multiple level-ups from one delta are supported. A negative delta
    /// drains in-level XP down to zero but never lowers the level.
    pub fn apply_xp_delta(&self, level: u32, xp_within_level: u32, delta: i64) -> LevelProgress {
        let previous_level = level.max(1);
        let xp = (xp_within_level as i64).saturating_add(delta).max(0) as u64;

        let (new_level, remaining) = self.normalize(previous_level, xp);

        LevelProgress {
            level: new_level,
            xp_within_level: remaining,
            xp_required_for_next_level: self.xp_for_level(new_level),
            leveled_up: new_level > previous_level,
            previous_level,
        }
    }

    /// Subtract thresholds until the remaining XP fits inside the level
    fn normalize(&self, mut level: u32, mut xp: u64) -> (u32, u32) {
        loop {
            let threshold = self.xp_for_level(level) as u64;
            if xp < threshold {
                return (level, xp as u32);
            }
            if level == u32::MAX {
                return (level, (threshold - 1) as u32);
            }
            xp -= threshold;
            level += 1;
        }
    }
}

/// Get a title/rank based on level
pub fn level_title(level: u32) -> &'static str {
    match level {
        0..=2 => "Novice",
        3..=4 => "Apprentice",
        5..=7 => "Journeyman",
        8..=10 => "Adept",
        11..=14 => "Expert",
        15..=18 => "Master",
        19..=24 => "Grandmaster",
        _ => "Legend",
    }
}
