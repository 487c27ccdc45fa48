/// Tool for viewing the player profile
///
/// This module implements the player_profile MCP tool: level, XP progress
/// and the achievement badges earned so far.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{level_title, Achievement};
use crate::engine::RewardEngine;
use crate::storage::{HabitStorage, StorageError};

/// Parameters for viewing the profile (none required)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ProfileParams {}

/// One badge in the catalog
#[derive(Debug, Serialize)]
pub struct AchievementInfo {
    pub key: String,
    pub title: String,
    pub description: String,
    pub bonus_xp: u32,
    pub unlocked: bool,
}

/// Response from viewing the profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub level: u32,
    pub title: String,
    pub xp_within_level: u32,
    pub xp_required_for_next_level: u32,
    pub progress_percent: u32,
    pub total_xp: u64,
    pub total_completions: u64,
    pub achievements: Vec<AchievementInfo>,
    pub message: String,
}

/// Read the player profile using the provided storage
pub fn get_player_profile<S: HabitStorage>(
    storage: &S,
    engine: &RewardEngine,
    _params: ProfileParams,
) -> Result<ProfileResponse, StorageError> {
    let profile = storage.get_profile()?;
    let unlocked = storage.get_unlocked_achievements()?;

    // Display from lifetime XP when the stored pair has drifted
    let state = if profile.is_consistent_with(engine.levels()) {
        profile.level_state(engine.levels())
    } else {
        tracing::warn!(
            "Stored level {} disagrees with lifetime XP {}, showing the rebuilt level",
            profile.level,
            profile.total_xp
        );
        engine.levels().level_from_total_xp(profile.total_xp)
    };

    let achievements: Vec<AchievementInfo> = Achievement::ALL
        .iter()
        .map(|a| AchievementInfo {
            key: a.key().to_string(),
            title: a.title().to_string(),
            description: a.description().to_string(),
            bonus_xp: a.bonus_xp(),
            unlocked: unlocked.contains(a),
        })
        .collect();

    let title = level_title(state.level);
    let mut message = format!(
        "🏆 Level {} {}\n📊 {}/{} XP to next level ({}%)\n✨ {} lifetime XP from {} completions",
        state.level,
        title,
        state.xp_within_level,
        state.xp_required_for_next_level,
        state.progress_percent(),
        profile.total_xp,
        profile.total_completions
    );

    if unlocked.is_empty() {
        message.push_str("\n🏅 No achievements yet. Complete a habit to earn your first!");
    } else {
        message.push_str(&format!("\n🏅 Achievements ({}/{}):", unlocked.len(), Achievement::ALL.len()));
        for achievement in &unlocked {
            message.push_str(&format!("\n   • {} - {}", achievement.title(), achievement.description()));
        }
    }

    Ok(ProfileResponse {
        level: state.level,
        title: title.to_string(),
        xp_within_level: state.xp_within_level,
        xp_required_for_next_level: state.xp_required_for_next_level,
        progress_percent: state.progress_percent(),
        total_xp: profile.total_xp,
        total_completions: profile.total_completions,
        achievements,
        message,
    })
}
