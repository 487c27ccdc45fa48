/// Main entry point for the Habit Quest MCP server
///
/// This file sets up logging, parses command line arguments, loads the reward
/// configuration and starts the MCP server. The server listens for JSON-RPC
/// requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use habit_quest_mcp::{HabitQuestServer, RewardConfig};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::data_dir().map(|p| p.join("habit_quest")),
        dirs::home_dir().map(|p| p.join(".habit_quest")),
        dirs::config_dir().map(|p| p.join("habit_quest")),
        std::env::current_dir().ok().map(|p| p.join(".habit_quest")),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Make sure the directory is actually writable
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let temp_path = std::env::temp_dir().join("habit_quest");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join("habits.db"))
}

/// Command line arguments for the Habit Quest MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's data directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Path to a TOML reward configuration file
    /// If not provided, uses habit_quest/config.toml in the config directory when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_quest_mcp={}", log_level))
        .with_writer(std::io::stderr) // stdout carries JSON-RPC
        .init();

    if args.write_default_config {
        let path = args
            .config
            .or_else(RewardConfig::default_config_path)
            .ok_or("No config directory available; pass --config")?;
        RewardConfig::default().save_to(&path)?;
        eprintln!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    info!("Starting Habit Quest MCP server");

    let config = RewardConfig::load_or_default(args.config.as_deref())?;

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let server = HabitQuestServer::new(db_path, config).await?;

    // Handles JSON-RPC over stdin/stdout until stdin closes
    server.run().await?;

    info!("Habit Quest MCP server shutdown complete");
    Ok(())
}
