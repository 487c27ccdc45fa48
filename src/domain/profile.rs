/// The player's progress across all habits
///
/// There is a single local player. Lifetime XP is the source of truth; the
/// (level, xp_within_level) pair is a running cache of it.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::domain::{LevelProgress, LevelResolver, LevelState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub level: u32,
    pub xp_within_level: u32,
    /// XP earned over the player's lifetime
    pub total_xp: u64,
    /// Completions across all habits
    pub total_completions: u64,
    pub updated_at: DateTime<Utc>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerProfile {
    /// A fresh level-1 profile
    pub fn new() -> Self {
        Self {
            level: 1,
            xp_within_level: 0,
            total_xp: 0,
            total_completions: 0,
            updated_at: Utc::now(),
        }
    }

    /// Current position on the level curve
    pub fn level_state(&self, resolver: &LevelResolver) -> LevelState {
        LevelState {
            level: self.level,
            xp_within_level: self.xp_within_level,
            xp_required_for_next_level: resolver.xp_for_level(self.level),
        }
    }

    /// Whether the cached pair agrees with lifetime XP under `resolver`'s curve
    pub fn is_consistent_with(&self, resolver: &LevelResolver) -> bool {
        let expected = resolver.level_from_total_xp(self.total_xp);
        expected.level == self.level && expected.xp_within_level == self.xp_within_level
    }

    /// Rebuild the cached pair from lifetime XP
    pub fn reconciled(&self, resolver: &LevelResolver) -> PlayerProfile {
        let state = resolver.level_from_total_xp(self.total_xp);
        PlayerProfile {
            level: state.level,
            xp_within_level: state.xp_within_level,
            ..self.clone()
        }
    }

    /// Profile after one completion granting `xp_gained` through `progress`
    pub fn with_progress(&self, progress: &LevelProgress, xp_gained: u32) -> PlayerProfile {
        PlayerProfile {
            level: progress.level,
            xp_within_level: progress.xp_within_level,
            total_xp: self.total_xp.saturating_add(xp_gained as u64),
            total_completions: self.total_completions.saturating_add(1),
            updated_at: Utc::now(),
        }
    }
}
