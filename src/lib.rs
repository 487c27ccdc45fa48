/// Public library interface for the Habit Quest MCP server
///
/// This module exports the main server implementation and public types
/// that can be used by other applications or tests.

use std::path::PathBuf;
use thiserror::Error;

pub mod config;
pub mod engine;
pub mod mcp;
pub mod tools;
mod domain;
mod storage;

// Re-export public modules and types
pub use config::{ConfigError, RewardConfig};
pub use domain::*;
pub use engine::{CompletionOutcome, RewardEngine};
pub use storage::{HabitStorage, SqliteStorage, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main habit quest server that implements the MCP protocol
///
/// This server keeps habits and player progress in a SQLite database and
/// scores completions with a reward engine built from the loaded config.
pub struct HabitQuestServer {
    storage: SqliteStorage,
    engine: RewardEngine,
}

impl HabitQuestServer {
    /// Create a new server with the specified database path and reward config
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf, config: RewardConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Quest server with database: {:?}", db_path);

        config.validate()?;
        let storage = SqliteStorage::new(db_path)?;

        Ok(Self::with_storage(storage, &config))
    }

    /// Build a server around an already opened storage
    pub fn with_storage(storage: SqliteStorage, config: &RewardConfig) -> Self {
        Self {
            storage,
            engine: RewardEngine::new(config),
        }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        // Test database connectivity
        let habits = self.storage.list_habits(false)?;
        let profile = self.storage.get_profile()?;
        tracing::info!(
            "Server started successfully, found {} existing habits (player level {})",
            habits.len(),
            profile.level
        );

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the reward engine
    pub fn engine(&self) -> &RewardEngine {
        &self.engine
    }
}
