/// Reward configuration loading and its effect on the engine
use chrono::NaiveDate;
use habit_quest_mcp::*;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_partial_file_overrides_only_named_fields() {
        let config = RewardConfig::from_toml_str(
            r#"
            [reward]
            hard_xp = 80

            [level]
            base_xp_per_level = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.reward.hard_xp, 80);
        assert_eq!(config.reward.easy_xp, 10);
        assert_eq!(config.level.base_xp_per_level, 50);
        assert_eq!(config.streak.grace_period_hours, 4);
        assert!(config.achievements.enabled);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = RewardConfig::from_toml_str("[streak]\nweekly_window_days = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = RewardConfig::from_toml_str("[reward\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let result = RewardConfig::load_or_default(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_saved_config_drives_the_engine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("habit_quest").join("config.toml");

        let mut config = RewardConfig::default();
        config.reward.easy_xp = 15;
        config.achievements.enabled = false;
        config.save_to(&path).unwrap();

        let loaded = RewardConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(loaded, config);

        let engine = RewardEngine::new(&loaded);
        let habit = Habit::new("Floss".to_string(), None, HabitCadence::Daily, DifficultyTier::Easy).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap().and_hms_opt(21, 0, 0).unwrap();

        let outcome = engine
            .score_completion(&habit, &PlayerProfile::new(), &[], now, None)
            .unwrap();
        assert_eq!(outcome.xp_gained(), 15);
        assert!(outcome.achievements.is_empty());
    }
}
