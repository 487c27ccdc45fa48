//! Configuration file support for the reward engine.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/habit_quest/config.toml`
//! unless a path is given on the command line. Every field has a default, so
//! a partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunable constants of the reward engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct RewardConfig {
    #[serde(default)]
    pub streak: StreakConfig,

    #[serde(default)]
    pub reward: RewardTableConfig,

    #[serde(default)]
    pub level: LevelConfig,

    #[serde(default)]
    pub achievements: AchievementConfig,
}

/// Streak window parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Hours past the end of the following day during which a daily streak survives
    #[serde(default = "default_grace_period_hours")]
    pub grace_period_hours: u32,

    #[serde(default = "default_weekly_window_days")]
    pub weekly_window_days: u32,

    /// Extra days after a full weekly window that still continue the streak
    #[serde(default = "default_weekly_grace_days")]
    pub weekly_grace_days: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            grace_period_hours: default_grace_period_hours(),
            weekly_window_days: default_weekly_window_days(),
            weekly_grace_days: default_weekly_grace_days(),
        }
    }
}

/// Base XP table and streak multiplier steps
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardTableConfig {
    #[serde(default = "default_easy_xp")]
    pub easy_xp: u32,

    #[serde(default = "default_medium_xp")]
    pub medium_xp: u32,

    #[serde(default = "default_hard_xp")]
    pub hard_xp: u32,

    #[serde(default = "default_multiplier_step_days")]
    pub multiplier_step_days: u32,

    /// Multiplier increase per step, in percent (10 = +0.1)
    #[serde(default = "default_multiplier_step_percent")]
    pub multiplier_step_percent: u32,

    /// Multiplier ceiling, in percent (200 = 2.0)
    #[serde(default = "default_max_multiplier_percent")]
    pub max_multiplier_percent: u32,
}

impl Default for RewardTableConfig {
    fn default() -> Self {
        Self {
            easy_xp: default_easy_xp(),
            medium_xp: default_medium_xp(),
            hard_xp: default_hard_xp(),
            multiplier_step_days: default_multiplier_step_days(),
            multiplier_step_percent: default_multiplier_step_percent(),
            max_multiplier_percent: default_max_multiplier_percent(),
        }
    }
}

/// Level curve parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default = "default_base_xp_per_level")]
    pub base_xp_per_level: u32,

    #[serde(default = "default_growth_multiplier")]
    pub growth_multiplier: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            base_xp_per_level: default_base_xp_per_level(),
            growth_multiplier: default_growth_multiplier(),
        }
    }
}

/// Achievement switches
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AchievementConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

// Default value functions
fn default_grace_period_hours() -> u32 {
    4
}

fn default_weekly_window_days() -> u32 {
    7
}

fn default_weekly_grace_days() -> u32 {
    1
}

fn default_easy_xp() -> u32 {
    10
}

fn default_medium_xp() -> u32 {
    25
}

fn default_hard_xp() -> u32 {
    50
}

fn default_multiplier_step_days() -> u32 {
    7
}

fn default_multiplier_step_percent() -> u32 {
    10
}

fn default_max_multiplier_percent() -> u32 {
    200
}

fn default_base_xp_per_level() -> u32 {
    100
}

fn default_growth_multiplier() -> f64 {
    1.2
}

fn default_true() -> bool {
    true
}

impl RewardConfig {
    /// Load configuration from an explicit path, or the default path if it exists
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let Some(config_path) = Self::default_config_path() else {
                    tracing::info!("No config directory available, using defaults");
                    return Ok(Self::default());
                };
                if config_path.exists() {
                    Self::load_from(&config_path)
                } else {
                    tracing::info!(
                        "No config file found at {:?}, using defaults",
                        config_path
                    );
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RewardConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("habit_quest").join("config.toml"))
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values that would make the engine's functions non-total
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.streak.weekly_window_days == 0 {
            return Err(ConfigError::Invalid(
                "streak.weekly_window_days must be at least 1".to_string(),
            ));
        }
        if self.reward.multiplier_step_days == 0 {
            return Err(ConfigError::Invalid(
                "reward.multiplier_step_days must be at least 1".to_string(),
            ));
        }
        if self.reward.max_multiplier_percent < 100 {
            return Err(ConfigError::Invalid(format!(
                "reward.max_multiplier_percent must be at least 100, got {}",
                self.reward.max_multiplier_percent
            )));
        }
        if self.level.base_xp_per_level == 0 {
            return Err(ConfigError::Invalid(
                "level.base_xp_per_level must be at least 1".to_string(),
            ));
        }
        // growth * base must stay >= 1 or level 1 would need zero XP
        let growth = self.level.growth_multiplier;
        if !growth.is_finite() || growth * self.level.base_xp_per_level as f64 <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "level.growth_multiplier must be finite and make level 1 cost more than 1 XP, got {}",
                growth
            )));
        }
        Ok(())
    }
}
