/// MCP tools for habit management
///
/// This module contains all the MCP tools that external clients (like Claude)
/// can call to interact with the habit tracker.

pub mod create;
pub mod complete;
pub mod status;
pub mod list;
pub mod update;
pub mod profile;

// Re-export tool functions for easy access
pub use create::*;
pub use complete::*;
pub use status::*;
pub use list::*;
pub use update::*;
pub use profile::*;

use crate::domain::{DomainError, HabitId};
use crate::storage::StorageError;

/// Parse a habit ID argument, rejecting empty or malformed values
fn parse_habit_id(raw: &str) -> Result<HabitId, StorageError> {
    if raw.trim().is_empty() {
        return Err(DomainError::Validation {
            message: "Habit ID cannot be empty".to_string(),
        }
        .into());
    }

    HabitId::from_string(raw).map_err(|_| StorageError::HabitNotFound {
        habit_id: raw.to_string(),
    })
}

/// "1 day" / "3 weeks"
fn pluralize(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
