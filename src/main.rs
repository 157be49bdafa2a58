//! Pomotrack CLI - schema lifecycle for the time-tracking store

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;

use pomotrack::config;

#[derive(Parser)]
#[command(name = "pomotrack")]
#[command(version = "0.0.1")]
#[command(about = "Schema lifecycle manager for the pomotrack time-tracking store")]
#[command(long_about = r#"
Pomotrack manages the SQLite store backing the time tracker:
  • Creates the schema and seed data for a fresh store
  • Migrates an older store forward to the current schema version
  • Reports the stored version and table counts

Example usage:
  pomotrack init
  pomotrack status --json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a pomotrack.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the store schema
    Init {
        /// Path to the store file (overrides config)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show the stored schema version and table counts
    Status {
        /// Path to the store file (overrides config)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let configured = config::load_config(cli.config.as_deref())?;
    let resolve_db = |flag: Option<PathBuf>| {
        flag.or_else(|| {
            configured
                .as_ref()
                .and_then(|c| c.database.as_ref())
                .map(PathBuf::from)
        })
        .unwrap_or_else(config::default_database_path)
    };

    match cli.command {
        Commands::Init { database } => commands::run_init(&resolve_db(database)),
        Commands::Status { database, json } => commands::run_status(&resolve_db(database), json),
    }
}
