/// Reward engine for scoring habit completions
///
/// This module wires the streak, reward and level rules together. Scoring is
/// pure: it takes the current habit and profile and returns their successors
/// plus a record of what happened. Reading and writing state is left to the
/// caller so any serialization strategy can wrap it.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::config::RewardConfig;
use crate::domain::{
    newly_unlocked, Achievement, AchievementContext, Completion, DomainError, Habit,
    LevelProgress, LevelResolver, PlayerProfile, RewardCalculator, RewardResult,
    StreakEvaluation, StreakEvaluator,
};

/// Everything produced by scoring one completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    /// The habit with its streak and totals advanced
    pub habit: Habit,
    pub completion: Completion,
    /// The profile with the XP applied
    pub profile: PlayerProfile,
    pub streak: StreakEvaluation,
    pub reward: RewardResult,
    pub level: LevelProgress,
    /// Badges unlocked by this completion
    pub achievements: Vec<Achievement>,
    /// The stored level pair disagreed with lifetime XP and was rebuilt
    pub profile_reconciled: bool,
}

impl CompletionOutcome {
    /// Completion XP plus achievement bonuses
    pub fn xp_gained(&self) -> u32 {
        self.completion.total_xp
    }
}

/// Streak, reward and level rules built from one configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardEngine {
    streaks: StreakEvaluator,
    rewards: RewardCalculator,
    levels: LevelResolver,
    achievements_enabled: bool,
}

impl Default for RewardEngine {
    fn default() -> Self {
        Self::new(&RewardConfig::default())
    }
}

impl RewardEngine {
    /// Create a reward engine from configuration
    pub fn new(config: &RewardConfig) -> Self {
        Self {
            streaks: StreakEvaluator::from_config(&config.streak),
            rewards: RewardCalculator::from_config(&config.reward),
            levels: LevelResolver::from_config(&config.level),
            achievements_enabled: config.achievements.enabled,
        }
    }

    pub fn streaks(&self) -> &StreakEvaluator {
        &self.streaks
    }

    pub fn rewards(&self) -> &RewardCalculator {
        &self.rewards
    }

    pub fn levels(&self) -> &LevelResolver {
        &self.levels
    }

    /// Score a completion of `habit` at `now`
    ///
    /// Fails if the habit is paused, if `now` is earlier than the last
    /// completion, or if the habit was already completed in the current
    /// cadence window.
    pub fn score_completion(
        &self,
        habit: &Habit,
        profile: &PlayerProfile,
        unlocked: &[Achievement],
        now: NaiveDateTime,
        notes: Option<String>,
    ) -> Result<CompletionOutcome, DomainError> {
        if !habit.is_active {
            return Err(DomainError::HabitPaused(habit.name.clone()));
        }

        let last = habit.streak.last_completed_at;
        if let Some(last) = last {
            if now < last {
                return Err(DomainError::InvalidDate(format!(
                    "Completion time {} is earlier than the last completion {}",
                    now, last
                )));
            }
        }

        if self.streaks.already_completed(last, habit.cadence, now) {
            return Err(DomainError::AlreadyCompleted {
                habit_name: habit.name.clone(),
                period: habit.cadence.period_name().to_string(),
            });
        }

        let streak = self.streaks.evaluate(habit.streak.current_streak, last, habit.cadence, now);
        let reward = self.rewards.calculate(&habit.difficulty, streak.new_streak);

        let profile_reconciled = !profile.is_consistent_with(&self.levels);
        let base_profile = if profile_reconciled {
            warn!(
                "Stored level {} ({} XP) does not match lifetime XP {}, rebuilding from the level curve",
                profile.level, profile.xp_within_level, profile.total_xp
            );
            profile.reconciled(&self.levels)
        } else {
            profile.clone()
        };

        let achievements = if self.achievements_enabled {
            let ctx = AchievementContext {
                cadence: habit.cadence,
                streak: streak.new_streak,
                lifetime_completions: base_profile.total_completions.saturating_add(1),
            };
            newly_unlocked(&ctx, unlocked)
        } else {
            Vec::new()
        };
        let achievement_xp: u32 = achievements.iter().map(|a| a.bonus_xp()).sum();

        let completion = Completion::new(
            habit.id.clone(),
            now,
            streak.new_streak,
            &reward,
            achievement_xp,
            notes,
        )?;

        let level = self.levels.apply_xp_delta(
            base_profile.level,
            base_profile.xp_within_level,
            completion.total_xp as i64,
        );

        let mut next_habit = habit.clone();
        next_habit.apply_completion(habit.streak.advance(&streak, now), reward.total_xp);
        let next_profile = base_profile.with_progress(&level, completion.total_xp);

        debug!(
            "Scored completion of '{}': streak {:?} -> {}, {} XP ({} base + {} bonus + {} achievements), level {} -> {}",
            habit.name,
            streak.outcome,
            streak.new_streak,
            completion.total_xp,
            reward.base_xp,
            reward.streak_bonus,
            achievement_xp,
            level.previous_level,
            level.level
        );

        Ok(CompletionOutcome {
            habit: next_habit,
            completion,
            profile: next_profile,
            streak,
            reward,
            level,
            achievements,
            profile_reconciled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DifficultyTier, HabitCadence, StreakOutcome, StreakState};
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn habit(cadence: HabitCadence, difficulty: DifficultyTier) -> Habit {
        Habit::new("Meditate".to_string(), None, cadence, difficulty).unwrap()
    }

    #[test]
    fn test_first_completion() {
        let engine = RewardEngine::default();
        let habit = habit(HabitCadence::Daily, DifficultyTier::Easy);
        let profile = PlayerProfile::new();

        let outcome = engine.score_completion(&habit, &profile, &[], at(1, 9), None).unwrap();

        assert_eq!(outcome.streak.outcome, StreakOutcome::Started);
        assert_eq!(outcome.reward.total_xp, 10);
        assert_eq!(outcome.achievements, vec![Achievement::FirstSteps]);
        // 10 XP + 20 XP first-steps bonus
        assert_eq!(outcome.xp_gained(), 30);
        assert_eq!(outcome.profile.total_xp, 30);
        assert_eq!(outcome.profile.total_completions, 1);
        assert_eq!(outcome.habit.streak.current_streak, 1);
        assert_eq!(outcome.habit.streak.last_completed_at, Some(at(1, 9)));
        assert_eq!(outcome.habit.total_xp_earned, 10);
        assert!(!outcome.profile_reconciled);
    }

    #[test]
    fn test_rejects_second_completion_in_same_window() {
        let engine = RewardEngine::default();
        let mut habit = habit(HabitCadence::Daily, DifficultyTier::Easy);
        habit.streak = StreakState { current_streak: 2, last_completed_at: Some(at(3, 8)) };

        let result = engine.score_completion(&habit, &PlayerProfile::new(), &[], at(3, 20), None);
        assert!(matches!(result, Err(DomainError::AlreadyCompleted { .. })));
    }

    #[test]
    fn test_rejects_time_before_last_completion() {
        let engine = RewardEngine::default();
        let mut habit = habit(HabitCadence::Weekly, DifficultyTier::Easy);
        habit.streak = StreakState { current_streak: 1, last_completed_at: Some(at(10, 8)) };

        let result = engine.score_completion(&habit, &PlayerProfile::new(), &[], at(2, 8), None);
        assert!(matches!(result, Err(DomainError::InvalidDate(_))));
    }

    #[test]
    fn test_rejects_paused_habit() {
        let engine = RewardEngine::default();
        let mut habit = habit(HabitCadence::Daily, DifficultyTier::Easy);
        habit.is_active = false;

        let result = engine.score_completion(&habit, &PlayerProfile::new(), &[], at(1, 8), None);
        assert!(matches!(result, Err(DomainError::HabitPaused(_))));
    }

    #[test]
    fn test_streak_milestone_unlocks_bonus_and_levels_up() {
        let engine = RewardEngine::default();
        let mut habit = habit(HabitCadence::Daily, DifficultyTier::Hard);
        habit.streak = StreakState { current_streak: 6, last_completed_at: Some(at(6, 21)) };

        let mut profile = PlayerProfile::new();
        profile.total_xp = 100;
        profile.xp_within_level = 100;
        profile.total_completions = 6;

        let outcome = engine
            .score_completion(&habit, &profile, &[Achievement::FirstSteps], at(7, 7), None)
            .unwrap();

        assert_eq!(outcome.streak.new_streak, 7);
        // 50 * 1.1 = 55
        assert_eq!(outcome.reward.total_xp, 55);
        assert_eq!(outcome.achievements, vec![Achievement::WeekWarrior]);
        assert_eq!(outcome.xp_gained(), 105);
        // 100 + 105 = 205: past 120 into level 2 with 85
        assert_eq!(outcome.level.level, 2);
        assert_eq!(outcome.level.xp_within_level, 85);
        assert!(outcome.level.leveled_up);
        assert_eq!(outcome.profile.total_xp, 205);
        assert!(outcome.profile.is_consistent_with(engine.levels()));
    }

    #[test]
    fn test_reconciles_inconsistent_profile() {
        let engine = RewardEngine::default();
        let habit = habit(HabitCadence::Daily, DifficultyTier::Medium);

        let mut profile = PlayerProfile::new();
        profile.total_xp = 500;
        profile.total_completions = 3;

        let outcome = engine
            .score_completion(&habit, &profile, &[Achievement::FirstSteps], at(1, 9), None)
            .unwrap();

        assert!(outcome.profile_reconciled);
        // 500 -> level 3 with 140; +25 -> 165
        assert_eq!(outcome.level.previous_level, 3);
        assert_eq!(outcome.profile.level, 3);
        assert_eq!(outcome.profile.xp_within_level, 165);
        assert_eq!(outcome.profile.total_xp, 525);
    }

    #[test]
    fn test_achievements_can_be_disabled() {
        let mut config = RewardConfig::default();
        config.achievements.enabled = false;
        let engine = RewardEngine::new(&config);
        let habit = habit(HabitCadence::Daily, DifficultyTier::Easy);

        let outcome = engine.score_completion(&habit, &PlayerProfile::new(), &[], at(1, 9), None).unwrap();
        assert!(outcome.achievements.is_empty());
        assert_eq!(outcome.xp_gained(), 10);
    }
}
