//! DataRecord command-line front-end.
//!
//! # Responsibility
//! - Stand in for the list and detail screens on a terminal.
//! - Reject blank text before any write is issued.
//!
//! # Usage
//!
//! ```bash
//! datarecord add "buy milk"
//! datarecord list --json
//! datarecord edit 1 "buy oat milk"
//! datarecord delete 1
//! datarecord shell
//! ```

mod commands;
mod render;
mod shell;

use clap::{Parser, Subcommand};
use datarecord_core::config::{DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
use datarecord_core::{
    init_logging, init_stderr_logging, AppDatabase, CoreConfig, RecordCoordinator, RecordId,
};
use log::{error, info};
use std::time::Instant;

/// Without an explicit level, stderr logging stays quiet enough for a terminal.
const STDERR_DEFAULT_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "datarecord", version)]
#[command(about = "Create, list, edit and delete text records", long_about = None)]
struct Cli {
    /// SQLite store file
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<String>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,
    /// Absolute directory for rotating log files
    #[arg(long, global = true, env = LOG_DIR_ENV)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every record
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one record
    Show { id: RecordId },
    /// Create a record
    Add { text: String },
    /// Replace a record's text
    Edit { id: RecordId, text: String },
    /// Delete a record
    Delete { id: RecordId },
    /// Interactive list/detail session
    Shell,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::Shell => "shell",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    match &config.log_dir {
        Some(dir) => init_logging(config.effective_log_level(), dir)?,
        None => init_stderr_logging(
            config
                .log_level
                .as_deref()
                .unwrap_or(STDERR_DEFAULT_LEVEL),
        )?,
    }

    let command = cli.command.name();
    let started_at = Instant::now();
    info!("event=cli_command module=cli status=start command={command}");

    let result = run(cli.command, &config).await;
    match &result {
        Ok(()) => info!(
            "event=cli_command module=cli status=ok command={} duration_ms={}",
            command,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=cli_command module=cli status=error command={} duration_ms={} error={}",
            command,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

async fn run(command: Command, config: &CoreConfig) -> anyhow::Result<()> {
    let database = AppDatabase::get_database(&config.db_path)?;
    let coordinator = RecordCoordinator::with_current_runtime(database.record_repository())?;

    match command {
        Command::List { json } => commands::list(&coordinator, json),
        Command::Show { id } => commands::show(&coordinator, id),
        Command::Add { text } => commands::add(&coordinator, text).await,
        Command::Edit { id, text } => commands::edit(&coordinator, id, text).await,
        Command::Delete { id } => commands::delete(&coordinator, id).await,
        Command::Shell => shell::run(&coordinator).await,
    }
}

/// Flags and their environment fallbacks are already merged by clap; this
/// applies the core rules for blank values and defaults.
fn resolve_config(cli: &Cli) -> CoreConfig {
    CoreConfig::from_lookup(|key| match key {
        DB_PATH_ENV => cli.db.clone(),
        LOG_LEVEL_ENV => cli.log_level.clone(),
        LOG_DIR_ENV => cli.log_dir.clone(),
        _ => None,
    })
}
