// Command implementations shared by the binary and the integration tests.

use std::sync::Arc;

use anyhow::{Context, Result};
use courtside_core::collaborators::Collaborators;
use courtside_core::model::TeamId;
use courtside_core::{LeagueContext, Phase, TeamStateLoader, TeamStates};
use tracing::info;

use crate::config::Config;
use crate::db::Database;

/// Persist league state and return it as the loader will see it.
pub fn init_league(
    db: &Database,
    season: i32,
    phase: Phase,
    user_tids: &[TeamId],
) -> Result<LeagueContext> {
    let league = LeagueContext::new(season, phase).with_user_tids(user_tids.iter().copied());
    db.save_league_context(&league)
        .context("failed to save league state")?;
    info!(season, phase = %phase, users = user_tids.len(), "league state initialized");
    Ok(league)
}

/// A loader reading from `db` with the configured rules and the standard
/// collaborators.
pub fn team_state_loader(db: Arc<Database>, config: &Config) -> TeamStateLoader {
    TeamStateLoader::new(
        db.clone(),
        db,
        Arc::new(config.rules.clone()),
        Collaborators::standard(config.league.num_teams),
    )
}

/// Build the pre-game states of `tids` against the league state stored in
/// `db`.
pub async fn load_states(db: Arc<Database>, config: &Config, tids: &[TeamId]) -> Result<TeamStates> {
    let league = db.load_league_context()?;
    let loader = team_state_loader(db, config);
    let states = loader
        .load_team_states(&league, tids)
        .await
        .with_context(|| format!("failed to load team states for {tids:?}"))?;
    Ok(states)
}

pub fn states_to_json(states: &TeamStates) -> Result<String> {
    serde_json::to_string_pretty(states).context("failed to serialize team states")
}
