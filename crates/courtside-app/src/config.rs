// Configuration loading and parsing (config/league.toml).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use courtside_core::composite::{CompositeRating, CompositeWeight};
use courtside_core::rules::{CompositeWeights, SimRules, StatSchema};
use courtside_core::{RulesError, Sport};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_DB_FILE: &str = "courtside.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub rules: SimRules,
    pub db_path: String,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    stats: StatsSection,
    composite_weights: BTreeMap<String, CompositeWeight>,
    #[serde(default)]
    database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub sport: String,
    #[serde(default)]
    pub ties: bool,
    pub num_teams: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct StatsSection {
    player: Vec<String>,
    team: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/league.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let text = read_file(&league_path)?;
    let file: LeagueFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: league_path.clone(),
        source: e,
    })?;

    validate_league(&file.league)?;
    let sport = Sport::from_str_sport(&file.league.sport).ok_or_else(|| {
        ConfigError::ValidationError {
            field: "league.sport".into(),
            message: format!(
                "unknown sport `{}` (expected basketball, football or hockey)",
                file.league.sport
            ),
        }
    })?;

    let rules = build_rules(sport, file.league.ties, file.composite_weights, file.stats)?;
    let db_path = file.database.path.unwrap_or_else(default_db_path);

    Ok(Config {
        league: file.league,
        rules,
        db_path,
    })
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&path, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {}: {e}", path.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Loads config relative to the current working directory, copying
/// defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// `<platform data dir>/courtside.db`, or the working directory when the
/// platform has no data dir.
fn default_db_path() -> String {
    directories::ProjectDirs::from("", "", "courtside")
        .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
        .to_string_lossy()
        .into_owned()
}

fn validate_league(league: &LeagueConfig) -> Result<(), ConfigError> {
    if league.num_teams == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.num_teams".into(),
            message: "must be greater than 0".into(),
        });
    }
    if league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }
    Ok(())
}

fn build_rules(
    sport: Sport,
    ties: bool,
    composite_weights: BTreeMap<String, CompositeWeight>,
    stats: StatsSection,
) -> Result<SimRules, ConfigError> {
    let mut table = BTreeMap::new();
    for (name, weight) in composite_weights {
        let Some(composite) = CompositeRating::from_name(&name) else {
            return Err(ConfigError::ValidationError {
                field: format!("composite_weights.{name}"),
                message: "unknown composite rating".into(),
            });
        };
        table.insert(composite, weight);
    }

    let composite_weights =
        CompositeWeights::new(table).map_err(|e| rules_error("composite_weights", e))?;
    let player_stats = StatSchema::new(stats.player, "player").map_err(|e| rules_error("stats.player", e))?;
    let team_stats = StatSchema::new(stats.team, "team").map_err(|e| rules_error("stats.team", e))?;

    Ok(SimRules::new(sport, ties, composite_weights, player_stats, team_stats))
}

fn rules_error(field: &str, e: RulesError) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: e.to_string(),
    }
}
