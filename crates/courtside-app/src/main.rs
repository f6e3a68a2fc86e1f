// Courtside entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries command output)
// 2. Load config
// 3. Open database
// 4. Dispatch the command

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use courtside::cli::{Cli, Command};
use courtside::commands;
use courtside::config;
use courtside::db::Database;
use courtside::import;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    let command = Cli::parse().command;
    info!(?command, "courtside starting");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, sport={}, {} teams, {} composites",
        config.league.name,
        config.league.sport,
        config.league.num_teams,
        config.rules.composite_weights.len()
    );

    // 3. Open database
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let db = Arc::new(Database::open(&config.db_path).context("failed to open database")?);
    info!("Database opened at {}", config.db_path);

    // 4. Dispatch
    match command {
        Command::Init {
            season,
            phase,
            user_tids,
        } => {
            commands::init_league(&db, season, phase, &user_tids)?;
            println!("league state set: season {season}, phase {phase}");
        }
        Command::Import { dir } => {
            let summary = import::import_dir(&db, &dir)?;
            println!(
                "imported {} teams, {} team seasons, {} players",
                summary.teams, summary.seasons, summary.players
            );
        }
        Command::Load { tids } => {
            let states = commands::load_states(db, &config, &tids).await?;
            println!("{}", commands::states_to_json(&states)?);
        }
    }

    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which carries the
/// command's output).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("courtside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("courtside=info,courtside_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
