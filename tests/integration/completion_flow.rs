/// End-to-end completion flow through the tools and a file-backed database
use chrono::{NaiveDate, NaiveDateTime};
use habit_quest_mcp::tools::*;
use habit_quest_mcp::*;
use tempfile::NamedTempFile;

fn at(d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn create(storage: &SqliteStorage, name: &str, cadence: &str, difficulty: &str) -> String {
    create_habit(
        storage,
        CreateHabitParams {
            name: name.to_string(),
            description: None,
            cadence: cadence.to_string(),
            difficulty: Some(difficulty.to_string()),
        },
    )
    .expect("Failed to create habit")
    .habit_id
    .expect("Missing habit id")
}

fn complete(storage: &SqliteStorage, engine: &RewardEngine, habit_id: &str, now: NaiveDateTime) -> CompleteHabitResponse {
    complete_habit(
        storage,
        engine,
        CompleteHabitParams {
            habit_id: habit_id.to_string(),
            completed_at: None,
            notes: None,
        },
        now,
    )
    .expect("Failed to complete habit")
}

#[cfg(test)]
mod completion_flow_tests {
    use super::*;

    #[test]
    fn test_week_long_daily_streak() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf()).expect("Failed to create storage");
        let engine = RewardEngine::default();
        let habit_id = create(&storage, "Run", "daily", "hard");

        let mut last = None;
        for day in 1..=7 {
            last = Some(complete(&storage, &engine, &habit_id, at(day, 7)));
        }
        let last = last.unwrap();

        assert_eq!(last.current_streak, 7);
        // 50 * 1.1 on the seventh day plus the week-warrior badge
        assert_eq!(last.base_xp, 50);
        assert_eq!(last.streak_bonus, 5);
        assert_eq!(last.achievements, vec!["Week Warrior".to_string()]);
        assert_eq!(last.xp_awarded, 105);

        let profile = storage.get_profile().unwrap();
        // 6 * 50 + 55 + 20 first steps + 50 week warrior
        assert_eq!(profile.total_xp, 425);
        assert_eq!(profile.total_completions, 7);
        assert!(profile.is_consistent_with(engine.levels()));
        assert_eq!(profile.level, 3);

        let status = get_habit_status(
            &storage,
            &engine,
            StatusParams { habit_id: Some(habit_id.clone()), include_recent: Some(true) },
            at(7, 20),
        )
        .unwrap();
        assert_eq!(status.habits[0].status, "done");
        assert_eq!(status.habits[0].recent_completions.as_ref().unwrap().len(), 5);
    }

    #[test]
    fn test_paused_habit_cannot_be_completed() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf()).expect("Failed to create storage");
        let engine = RewardEngine::default();
        let habit_id = create(&storage, "Guitar", "weekly", "medium");

        update_habit(
            &storage,
            UpdateHabitParams {
                habit_id: habit_id.clone(),
                name: None,
                description: None,
                difficulty: None,
                is_active: Some(false),
            },
        )
        .unwrap();

        let result = complete_habit(
            &storage,
            &engine,
            CompleteHabitParams { habit_id, completed_at: None, notes: None },
            at(3, 9),
        );
        assert!(matches!(result, Err(StorageError::Domain(DomainError::HabitPaused(_)))));
        assert_eq!(storage.get_profile().unwrap().total_xp, 0);
    }

    #[test]
    fn test_progress_survives_reopening_the_database() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();
        let engine = RewardEngine::default();

        let habit_id = {
            let storage = SqliteStorage::new(db_path.clone()).expect("Failed to create storage");
            let habit_id = create(&storage, "Read", "weekly", "easy");
            complete(&storage, &engine, &habit_id, at(1, 18));
            complete(&storage, &engine, &habit_id, at(8, 18));
            habit_id
        };

        let storage = SqliteStorage::new(db_path).expect("Failed to reopen storage");
        let listed = list_habits(&storage, ListHabitsParams { active_only: Some(true), sort_by: None }).unwrap();
        assert_eq!(listed.habits.len(), 1);
        assert_eq!(listed.habits[0].habit_id, habit_id);
        assert_eq!(listed.habits[0].current_streak, 2);
        assert_eq!(listed.habits[0].total_completions, 2);

        let profile = get_player_profile(&storage, &engine, ProfileParams::default()).unwrap();
        // 10 + 10 + 20 first steps
        assert_eq!(profile.total_xp, 40);
        assert!(profile.achievements.iter().any(|a| a.key == "first_steps" && a.unlocked));

        // The next weekly completion in the same window is refused
        let result = complete_habit(
            &storage,
            &engine,
            CompleteHabitParams { habit_id, completed_at: None, notes: None },
            at(10, 18),
        );
        assert!(matches!(result, Err(StorageError::Domain(DomainError::AlreadyCompleted { .. }))));
    }
}
