/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::path::PathBuf;
use rusqlite::{params, Connection, OptionalExtension, Row};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::domain::{
    Achievement, Completion, CompletionId, DifficultyTier, Habit, HabitCadence, HabitId,
    PlayerProfile, StreakState,
};
use crate::storage::{migrations, HabitStorage, StorageError};

const HABIT_COLUMNS: &str = "id, name, description, cadence, difficulty, current_streak, \
    last_completed_at, longest_streak, total_completions, total_xp_earned, created_at, is_active";

const COMPLETION_COLUMNS: &str = "id, habit_id, logged_at, completed_at, streak_after, \
    base_xp, streak_bonus, achievement_xp, total_xp, notes";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Create a storage instance backed by a private in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // Enable foreign key constraints
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }
}

/// Build a column conversion error the way rusqlite reports them
fn invalid_column(index: usize, message: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, message.to_string(), rusqlite::types::Type::Text)
}

fn parse_timestamp(index: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid_column(index, "Invalid datetime"))
}

fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let id_str: String = row.get(0)?;
    let id = HabitId::from_string(&id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;

    let cadence_str: String = row.get(3)?;
    let cadence = HabitCadence::parse(&cadence_str).map_err(|_| invalid_column(3, "Invalid cadence"))?;

    let difficulty_str: String = row.get(4)?;

    let total_xp_earned: i64 = row.get(9)?;
    let created_at_str: String = row.get(10)?;

    Ok(Habit {
        id,
        name: row.get(1)?,
        description: row.get(2)?,
        cadence,
        difficulty: DifficultyTier::parse(&difficulty_str),
        streak: StreakState {
            current_streak: row.get(5)?,
            last_completed_at: row.get::<_, Option<NaiveDateTime>>(6)?,
        },
        longest_streak: row.get(7)?,
        total_completions: row.get(8)?,
        total_xp_earned: total_xp_earned.max(0) as u64,
        created_at: parse_timestamp(10, &created_at_str)?,
        is_active: row.get(11)?,
    })
}

fn row_to_completion(row: &Row<'_>) -> rusqlite::Result<Completion> {
    let id_str: String = row.get(0)?;
    let id = CompletionId::from_string(&id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;

    let habit_id_str: String = row.get(1)?;
    let habit_id = HabitId::from_string(&habit_id_str).map_err(|_| invalid_column(1, "Invalid UUID"))?;

    let logged_at_str: String = row.get(2)?;

    Ok(Completion {
        id,
        habit_id,
        logged_at: parse_timestamp(2, &logged_at_str)?,
        completed_at: row.get(3)?,
        streak_after: row.get(4)?,
        base_xp: row.get(5)?,
        streak_bonus: row.get(6)?,
        achievement_xp: row.get(7)?,
        total_xp: row.get(8)?,
        notes: row.get(9)?,
    })
}

impl HabitStorage for SqliteStorage {
    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.conn.execute(
            &format!(
                "INSERT INTO habits ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                HABIT_COLUMNS
            ),
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.cadence.as_str(),
                habit.difficulty.as_str(),
                habit.streak.current_streak,
                habit.streak.last_completed_at,
                habit.longest_streak,
                habit.total_completions,
                habit.total_xp_earned as i64,
                habit.created_at.to_rfc3339(),
                habit.is_active
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM habits WHERE id = ?1",
            HABIT_COLUMNS
        ))?;

        let habit = stmt.query_row(params![habit_id.to_string()], row_to_habit).optional()?;

        habit.ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })
    }

    /// Update an existing habit's settings
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                difficulty = ?4,
                is_active = ?5
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.difficulty.as_str(),
                habit.is_active
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Soft delete a habit (mark as inactive)
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET is_active = 0 WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Soft deleted habit: {}", habit_id);
        Ok(())
    }

    /// List habits, newest first
    fn list_habits(&self, active_only: bool) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits", HABIT_COLUMNS);

        if active_only {
            sql.push_str(" WHERE is_active = 1");
        }

        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let habits = stmt
            .query_map([], row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    /// Get completions for a specific habit, newest first
    fn get_completions_for_habit(
        &self,
        habit_id: &HabitId,
        limit: Option<u32>,
    ) -> Result<Vec<Completion>, StorageError> {
        // SQLite treats a negative LIMIT as unlimited
        let limit = limit.map(i64::from).unwrap_or(-1);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM completions WHERE habit_id = ?1
             ORDER BY completed_at DESC, logged_at DESC LIMIT ?2",
            COMPLETION_COLUMNS
        ))?;

        let completions = stmt
            .query_map(params![habit_id.to_string(), limit], row_to_completion)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(completions)
    }

    /// Get the player profile, or a fresh level-1 profile
    fn get_profile(&self) -> Result<PlayerProfile, StorageError> {
        let profile = self.conn
            .query_row(
                "SELECT level, xp_within_level, total_xp, total_completions, updated_at
                 FROM player_profile WHERE id = 1",
                [],
                |row| {
                    let total_xp: i64 = row.get(2)?;
                    let total_completions: i64 = row.get(3)?;
                    let updated_at_str: String = row.get(4)?;
                    Ok(PlayerProfile {
                        level: row.get(0)?,
                        xp_within_level: row.get(1)?,
                        total_xp: total_xp.max(0) as u64,
                        total_completions: total_completions.max(0) as u64,
                        updated_at: parse_timestamp(4, &updated_at_str)?,
                    })
                },
            )
            .optional()?;

        Ok(profile.unwrap_or_default())
    }

    /// Get unlocked achievements in unlock order
    fn get_unlocked_achievements(&self) -> Result<Vec<Achievement>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT key FROM achievements ORDER BY unlocked_at ASC, key ASC"
        )?;

        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let achievements = keys
            .iter()
            .filter_map(|key| {
                let achievement = Achievement::from_key(key);
                if achievement.is_none() {
                    tracing::warn!("Ignoring unknown achievement key in database: {}", key);
                }
                achievement
            })
            .collect();

        Ok(achievements)
    }

    /// Persist a scored completion in one transaction
    fn record_completion(
        &self,
        expected_last_completed_at: Option<NaiveDateTime>,
        habit: &Habit,
        completion: &Completion,
        profile: &PlayerProfile,
        achievements: &[Achievement],
    ) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let stored_last: Option<Option<NaiveDateTime>> = tx
            .query_row(
                "SELECT last_completed_at FROM habits WHERE id = ?1",
                params![habit.id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match stored_last {
            None => {
                return Err(StorageError::HabitNotFound {
                    habit_id: habit.id.to_string(),
                })
            }
            Some(stored) if stored != expected_last_completed_at => {
                return Err(StorageError::StaleCompletion {
                    habit_id: habit.id.to_string(),
                })
            }
            Some(_) => {}
        }

        tx.execute(
            "UPDATE habits SET
                current_streak = ?2,
                last_completed_at = ?3,
                longest_streak = ?4,
                total_completions = ?5,
                total_xp_earned = ?6
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.streak.current_streak,
                habit.streak.last_completed_at,
                habit.longest_streak,
                habit.total_completions,
                habit.total_xp_earned as i64
            ],
        )?;

        tx.execute(
            &format!(
                "INSERT INTO completions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                COMPLETION_COLUMNS
            ),
            params![
                completion.id.to_string(),
                completion.habit_id.to_string(),
                completion.logged_at.to_rfc3339(),
                completion.completed_at,
                completion.streak_after,
                completion.base_xp,
                completion.streak_bonus,
                completion.achievement_xp,
                completion.total_xp,
                completion.notes
            ],
        )?;

        tx.execute(
            "INSERT INTO player_profile (id, level, xp_within_level, total_xp, total_completions, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                level = excluded.level,
                xp_within_level = excluded.xp_within_level,
                total_xp = excluded.total_xp,
                total_completions = excluded.total_completions,
                updated_at = excluded.updated_at",
            params![
                profile.level,
                profile.xp_within_level,
                profile.total_xp as i64,
                profile.total_completions as i64,
                profile.updated_at.to_rfc3339()
            ],
        )?;

        let unlocked_at = Utc::now().to_rfc3339();
        for achievement in achievements {
            tx.execute(
                "INSERT OR IGNORE INTO achievements (key, unlocked_at) VALUES (?1, ?2)",
                params![achievement.key(), unlocked_at],
            )?;
        }

        tx.commit()?;

        tracing::debug!(
            "Recorded completion {} for habit {} ({} XP)",
            completion.id,
            habit.id,
            completion.total_xp
        );
        Ok(())
    }
}
