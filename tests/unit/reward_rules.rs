/// Streak, reward and level rules exercised through the public API
use chrono::{NaiveDate, NaiveDateTime};
use habit_quest_mcp::*;

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, d)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

const TIERS: [DifficultyTier; 3] = [DifficultyTier::Easy, DifficultyTier::Medium, DifficultyTier::Hard];

#[cfg(test)]
mod reward_tests {
    use super::*;

    #[test]
    fn test_total_never_below_base() {
        let calculator = RewardCalculator::default();
        for tier in &TIERS {
            for streak in 0..=120 {
                let reward = calculator.calculate(tier, streak);
                assert!(reward.total_xp >= reward.base_xp, "{:?} at streak {}", tier, streak);
                assert_eq!(reward.total_xp, reward.base_xp + reward.streak_bonus);
            }
        }
    }

    #[test]
    fn test_multiplier_is_monotonic_and_capped() {
        let calculator = RewardCalculator::default();
        let mut previous = calculator.multiplier_for_streak(0);
        for streak in 1..=200 {
            let current = calculator.multiplier_for_streak(streak);
            assert!(current >= previous, "multiplier dropped at streak {}", streak);
            assert!(current <= 2.0);
            previous = current;
        }
    }

    #[test]
    fn test_reward_scenarios() {
        let calculator = RewardCalculator::default();

        let easy = calculator.calculate(&DifficultyTier::Easy, 0);
        assert_eq!(easy.total_xp, 10);
        assert_eq!(easy.base_xp, 10);
        assert_eq!(easy.streak_multiplier, 1.0);
        assert_eq!(easy.streak_bonus, 0);

        let medium = calculator.calculate(&DifficultyTier::Medium, 14);
        assert_eq!(medium.total_xp, 30);
        assert_eq!(medium.base_xp, 25);
        assert_eq!(medium.streak_multiplier, 1.2);
        assert_eq!(medium.streak_bonus, 5);
    }

    #[test]
    fn test_unknown_tier_earns_medium() {
        let calculator = RewardCalculator::default();
        let odd = DifficultyTier::parse("legendary");
        assert!(!odd.is_recognized());
        assert_eq!(calculator.calculate(&odd, 3), calculator.calculate(&DifficultyTier::Medium, 3));
    }
}

#[cfg(test)]
mod streak_tests {
    use super::*;

    #[test]
    fn test_first_completion_for_any_cadence() {
        let evaluator = StreakEvaluator::default();
        for cadence in [HabitCadence::Daily, HabitCadence::Weekly] {
            let eval = evaluator.evaluate(0, None, cadence, at(10, 12, 0));
            assert_eq!(eval.new_streak, 1);
            assert!(!eval.streak_broken);
            assert!(eval.is_new_streak);
        }
    }

    #[test]
    fn test_same_day_is_idempotent() {
        let evaluator = StreakEvaluator::default();
        let last = at(10, 7, 0);
        let now = at(10, 21, 0);

        let first = evaluator.evaluate(4, Some(last), HabitCadence::Daily, now);
        let second = evaluator.evaluate(4, Some(last), HabitCadence::Daily, now);
        assert_eq!(first.new_streak, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_late_night_completion_inside_grace() {
        let evaluator = StreakEvaluator::default();
        let eval = evaluator.evaluate(5, Some(at(9, 23, 59)), HabitCadence::Daily, at(10, 2, 30));
        assert_eq!(eval.new_streak, 6);
        assert!(!eval.streak_broken);
        assert!(!eval.is_new_streak);
    }

    #[test]
    fn test_two_day_gap_resets() {
        let evaluator = StreakEvaluator::default();
        let eval = evaluator.evaluate(5, Some(at(8, 12, 0)), HabitCadence::Daily, at(10, 12, 0));
        assert_eq!(eval.new_streak, 1);
        assert!(eval.streak_broken);
        assert!(eval.is_new_streak);
    }

    #[test]
    fn test_weekly_windows() {
        let evaluator = StreakEvaluator::default();
        let last = at(1, 10, 0);

        assert_eq!(evaluator.evaluate(3, Some(last), HabitCadence::Weekly, at(6, 10, 0)).new_streak, 3);
        assert_eq!(evaluator.evaluate(3, Some(last), HabitCadence::Weekly, at(8, 10, 0)).new_streak, 4);
        assert_eq!(evaluator.evaluate(3, Some(last), HabitCadence::Weekly, at(9, 10, 0)).new_streak, 4);

        let late = evaluator.evaluate(3, Some(last), HabitCadence::Weekly, at(10, 10, 0));
        assert_eq!(late.new_streak, 1);
        assert!(late.streak_broken);
    }

    #[test]
    fn test_longer_grace_is_configurable() {
        let evaluator = StreakEvaluator::new(12, 7, 1);
        let eval = evaluator.evaluate(2, Some(at(8, 9, 0)), HabitCadence::Daily, at(10, 11, 0));
        assert_eq!(eval.new_streak, 3);
    }
}

#[cfg(test)]
mod level_tests {
    use super::*;

    #[test]
    fn test_thresholds_strictly_increase() {
        let resolver = LevelResolver::default();
        for level in 1..200 {
            assert!(resolver.xp_for_level(level + 1) > resolver.xp_for_level(level));
        }
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let resolver = LevelResolver::default();
        for level in 1..20 {
            let required = resolver.xp_for_level(level);
            for xp in [0, 1, required / 2, required - 1] {
                let progress = resolver.apply_xp_delta(level, xp, 0);
                assert_eq!(progress.level, level);
                assert_eq!(progress.xp_within_level, xp);
                assert!(!progress.leveled_up);
            }
        }
    }

    #[test]
    fn test_multi_level_jump_matches_iterative_subtraction() {
        let resolver = LevelResolver::default();
        let progress = resolver.apply_xp_delta(1, 90, 300);

        let mut level = 1;
        let mut xp = 390;
        while xp >= resolver.xp_for_level(level) {
            xp -= resolver.xp_for_level(level);
            level += 1;
        }

        assert!(progress.leveled_up);
        assert_eq!(progress.level, level);
        assert_eq!(progress.xp_within_level, xp);
        assert_eq!(progress.previous_level, 1);
        assert_eq!(progress.levels_gained(), level - 1);
    }

    #[test]
    fn test_negative_delta_never_lowers_level() {
        let resolver = LevelResolver::default();
        let progress = resolver.apply_xp_delta(4, 30, -500);
        assert_eq!(progress.level, 4);
        assert_eq!(progress.xp_within_level, 0);
        assert!(!progress.leveled_up);
    }

    #[test]
    fn test_total_xp_round_trip() {
        let resolver = LevelResolver::default();
        for total in [0u64, 119, 120, 359, 360, 1000, 5000] {
            let state = resolver.level_from_total_xp(total);
            let rebuilt = resolver.total_xp_for_level(state.level) + state.xp_within_level as u64;
            assert_eq!(rebuilt, total);
        }
    }
}
