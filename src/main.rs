//! Winnie CLI - a +50/-50 counter with a recorded history

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use winnie::config;

mod commands;

#[derive(Parser)]
#[command(name = "winnie")]
#[command(version)]
#[command(about = "Persisted counter that moves in steps of fifty and remembers every step")]
#[command(long_about = r#"
Winnie keeps one counter (150 to start with) and records every adjustment
in a local SQLite history table.

Example usage:
  winnie plus
  winnie minus
  winnie history --limit 10
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./winnie.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the database and preferences
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add 50 to the counter
    Plus,

    /// Subtract 50 from the counter (never below zero)
    Minus,

    /// Show the current counter value
    Count,

    /// List recorded adjustments, newest first
    History {
        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one history record
    Delete {
        /// Row id of the record
        #[arg(long)]
        id: i64,
    },

    /// Delete every history record
    Clear,

    /// Show database statistics
    Stats,

    /// Write a default winnie.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut cfg = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = Some(dir.to_string_lossy().to_string());
    }
    tracing::debug!("Using database {}", cfg.database_path().display());

    let result = match cli.command {
        Commands::Plus => commands::run_adjust(&cfg, commands::Direction::Up),
        Commands::Minus => commands::run_adjust(&cfg, commands::Direction::Down),
        Commands::Count => commands::run_count(&cfg),
        Commands::History { limit, json } => commands::run_history(&cfg, limit, json),
        Commands::Delete { id } => commands::run_delete(&cfg, Some(id)),
        Commands::Clear => commands::run_delete(&cfg, None),
        Commands::Stats => commands::run_stats(&cfg),
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            commands::run_init(&path, &cfg, force)
        }
    };

    if let Err(e) = result {
        tracing::debug!("Command failed: {:?}", e);
        winnie::ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
