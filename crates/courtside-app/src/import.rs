// League import from CSV files.
//
// A league directory holds teams.csv, team_seasons.csv and players.csv. Any
// players.csv column not listed in PLAYER_COLUMNS is a raw rating.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use courtside_core::model::{
    BudgetItem, DepthConfig, Expenses, Injury, Player, PlayerId, PlayerRatingSnapshot,
    RawRatings, Team, TeamId, TeamSeason, HEALTHY,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::Database;

pub const TEAMS_FILE: &str = "teams.csv";
pub const TEAM_SEASONS_FILE: &str = "team_seasons.csv";
pub const PLAYERS_FILE: &str = "players.csv";

/// players.csv columns that are not raw ratings.
const PLAYER_COLUMNS: [&str; 15] = [
    "pid",
    "tid",
    "first_name",
    "last_name",
    "born_year",
    "season",
    "pos",
    "ovr",
    "ovrs",
    "skills",
    "injury_type",
    "games_remaining",
    "roster_order",
    "pt_modifier",
    "value_no_pot",
];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Counts of what an import wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub teams: usize,
    pub seasons: usize,
    pub players: usize,
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawTeam {
    tid: TeamId,
    cid: i32,
    did: i32,
    /// JSON object of slot name to ordered player ids.
    #[serde(default)]
    depth: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeamSeason {
    tid: TeamId,
    season: i32,
    #[serde(default)]
    won: u32,
    #[serde(default)]
    lost: u32,
    #[serde(default)]
    tied: u32,
    #[serde(default)]
    health_amount: f64,
    health_rank: f64,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    pid: PlayerId,
    tid: TeamId,
    first_name: String,
    last_name: String,
    born_year: i32,
    season: i32,
    pos: String,
    ovr: f64,
    /// JSON object of position to overall rating at that position.
    #[serde(default)]
    ovrs: Option<String>,
    /// Space-separated skill tags.
    #[serde(default)]
    skills: Option<String>,
    #[serde(default)]
    injury_type: Option<String>,
    #[serde(default)]
    games_remaining: Option<u32>,
    #[serde(default)]
    roster_order: Option<i32>,
    #[serde(default)]
    pt_modifier: Option<f64>,
    value_no_pot: f64,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_teams_from_reader<R: Read>(rdr: R) -> Result<Vec<Team>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut teams = Vec::new();
    for result in reader.deserialize::<RawTeam>() {
        match result {
            Ok(raw) => {
                let depth = match raw.depth.as_deref().map(str::trim) {
                    None | Some("") => None,
                    Some(json) => match serde_json::from_str::<DepthConfig>(json) {
                        Ok(depth) => Some(depth),
                        Err(e) => {
                            warn!("ignoring malformed depth chart for team {}: {}", raw.tid, e);
                            None
                        }
                    },
                };
                teams.push(Team {
                    tid: raw.tid,
                    cid: raw.cid,
                    did: raw.did,
                    depth,
                });
            }
            Err(e) => {
                warn!("skipping malformed team row: {}", e);
            }
        }
    }
    Ok(teams)
}

fn load_team_seasons_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamSeason>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut seasons = Vec::new();
    for result in reader.deserialize::<RawTeamSeason>() {
        match result {
            Ok(raw) => {
                if !raw.health_rank.is_finite() {
                    warn!(
                        "skipping season {} for team {}: non-finite health rank",
                        raw.season, raw.tid
                    );
                    continue;
                }
                seasons.push(TeamSeason {
                    tid: raw.tid,
                    season: raw.season,
                    won: raw.won,
                    lost: raw.lost,
                    tied: raw.tied,
                    expenses: Expenses {
                        health: BudgetItem {
                            amount: raw.health_amount,
                            rank: raw.health_rank,
                        },
                    },
                });
            }
            Err(e) => {
                warn!("skipping malformed team season row: {}", e);
            }
        }
    }
    Ok(seasons)
}

/// One row per player and season. Rows sharing a pid become one player whose
/// rating history is ordered by season; the other player fields come from
/// the latest season's row.
fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers()?.clone();
    let rating_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !PLAYER_COLUMNS.contains(name))
        .map(|(i, name)| (i, name.to_string()))
        .collect();

    let mut rows: BTreeMap<PlayerId, Vec<(RawPlayer, RawRatings)>> = BTreeMap::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        };
        let raw: RawPlayer = match record.deserialize(Some(&headers)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        };

        let mut ratings = RawRatings::new();
        for (i, name) in &rating_columns {
            let Some(field) = record.get(*i).map(str::trim) else {
                continue;
            };
            if field.is_empty() {
                continue;
            }
            match field.parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    ratings.insert(name.clone(), v);
                }
                _ => warn!("player {}: ignoring non-numeric rating {}={:?}", raw.pid, name, field),
            }
        }
        rows.entry(raw.pid).or_default().push((raw, ratings));
    }

    Ok(rows.into_values().filter_map(merge_player_rows).collect())
}

/// Overall by position. The listed position always carries `ovr`.
fn position_ovrs(raw: &RawPlayer) -> BTreeMap<String, f64> {
    let pos = raw.pos.trim().to_string();
    let mut ovrs = match raw.ovrs.as_deref().map(str::trim) {
        None | Some("") => BTreeMap::new(),
        Some(json) => match serde_json::from_str::<BTreeMap<String, f64>>(json) {
            Ok(ovrs) => ovrs,
            Err(e) => {
                warn!("player {}: ignoring malformed ovrs for season {}: {}", raw.pid, raw.season, e);
                BTreeMap::new()
            }
        },
    };
    ovrs.insert(pos, raw.ovr);
    ovrs
}

fn merge_player_rows(mut rows: Vec<(RawPlayer, RawRatings)>) -> Option<Player> {
    rows.sort_by_key(|(raw, _)| raw.season);

    let mut seen = HashSet::new();
    rows.retain(|(raw, _)| {
        let first = seen.insert(raw.season);
        if !first {
            warn!("player {}: duplicate season {}, keeping the first row", raw.pid, raw.season);
        }
        first
    });

    let ratings = rows
        .iter()
        .map(|(raw, ratings)| PlayerRatingSnapshot {
            season: raw.season,
            pos: raw.pos.trim().to_string(),
            ovr: raw.ovr,
            ovrs: position_ovrs(raw),
            skills: raw
                .skills
                .as_deref()
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            raw: ratings.clone(),
        })
        .collect();

    let (latest, _) = rows.pop()?;
    Some(Player {
        pid: latest.pid,
        tid: latest.tid,
        first_name: latest.first_name.trim().to_string(),
        last_name: latest.last_name.trim().to_string(),
        born_year: latest.born_year,
        ratings,
        injury: Injury {
            kind: latest
                .injury_type
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| HEALTHY.to_string()),
            games_remaining: latest.games_remaining.unwrap_or(0),
        },
        roster_order: latest.roster_order.unwrap_or(latest.pid),
        pt_modifier: latest.pt_modifier.unwrap_or(1.0),
        value_no_pot: latest.value_no_pot,
    })
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, ImportError> {
    std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> ImportError + '_ {
    move |e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

pub fn load_teams(path: &Path) -> Result<Vec<Team>, ImportError> {
    load_teams_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_team_seasons(path: &Path) -> Result<Vec<TeamSeason>, ImportError> {
    load_team_seasons_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_players(path: &Path) -> Result<Vec<Player>, ImportError> {
    load_players_from_reader(open(path)?).map_err(csv_error(path))
}

/// Parsed contents of a league directory, checked for dangling team ids.
#[derive(Debug, Clone)]
pub struct LeagueFiles {
    pub teams: Vec<Team>,
    pub seasons: Vec<TeamSeason>,
    pub players: Vec<Player>,
}

pub fn load_league_dir(dir: &Path) -> Result<LeagueFiles, ImportError> {
    let teams = load_teams(&dir.join(TEAMS_FILE))?;
    let seasons = load_team_seasons(&dir.join(TEAM_SEASONS_FILE))?;
    let players = load_players(&dir.join(PLAYERS_FILE))?;

    if teams.is_empty() {
        return Err(ImportError::Validation(format!(
            "{TEAMS_FILE} produced zero valid rows"
        )));
    }

    let tids: HashSet<TeamId> = teams.iter().map(|t| t.tid).collect();
    if let Some(ts) = seasons.iter().find(|ts| !tids.contains(&ts.tid)) {
        return Err(ImportError::Validation(format!(
            "{TEAM_SEASONS_FILE}: season {} references unknown team {}",
            ts.season, ts.tid
        )));
    }
    // Negative tids are free agents and other non-league pools.
    if let Some(p) = players.iter().find(|p| p.tid >= 0 && !tids.contains(&p.tid)) {
        return Err(ImportError::Validation(format!(
            "{PLAYERS_FILE}: player {} references unknown team {}",
            p.pid, p.tid
        )));
    }

    Ok(LeagueFiles {
        teams,
        seasons,
        players,
    })
}

/// Read a league directory and write its records to `db` in one transaction.
pub fn import_dir(db: &Database, dir: &Path) -> anyhow::Result<ImportSummary> {
    let files = load_league_dir(dir)
        .with_context(|| format!("failed to read league files from {}", dir.display()))?;
    db.import_league(&files.teams, &files.seasons, &files.players)?;

    let summary = ImportSummary {
        teams: files.teams.len(),
        seasons: files.seasons.len(),
        players: files.players.len(),
    };
    info!(
        dir = %dir.display(),
        teams = summary.teams,
        seasons = summary.seasons,
        players = summary.players,
        "league import complete"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
