// SQLite persistence layer for league records and league state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use courtside_core::model::{
    BudgetItem, DepthConfig, ExhibitionRoster, Expenses, Injury, Player, PlayerId,
    PlayerRatingSnapshot, Team, TeamId, TeamSeason,
};
use courtside_core::store::{ExhibitionRosters, LeagueStore};
use courtside_core::{LeagueContext, Phase, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

/// Players per exhibition side.
pub const EXHIBITION_SIDE_SIZE: usize = 12;

/// SQLite-backed store for teams, team seasons, players and their rating
/// snapshots, exhibition rosters, and key-value league state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS teams (
                tid   INTEGER PRIMARY KEY,
                cid   INTEGER NOT NULL,
                did   INTEGER NOT NULL,
                depth TEXT
            );

            CREATE TABLE IF NOT EXISTS team_seasons (
                tid           INTEGER NOT NULL REFERENCES teams(tid),
                season        INTEGER NOT NULL,
                won           INTEGER NOT NULL DEFAULT 0,
                lost          INTEGER NOT NULL DEFAULT 0,
                tied          INTEGER NOT NULL DEFAULT 0,
                health_amount REAL NOT NULL DEFAULT 0,
                health_rank   REAL NOT NULL,
                PRIMARY KEY (tid, season)
            );

            CREATE TABLE IF NOT EXISTS players (
                pid             INTEGER PRIMARY KEY,
                tid             INTEGER NOT NULL,
                first_name      TEXT NOT NULL,
                last_name       TEXT NOT NULL,
                born_year       INTEGER NOT NULL,
                injury_type     TEXT NOT NULL DEFAULT 'Healthy',
                games_remaining INTEGER NOT NULL DEFAULT 0,
                roster_order    INTEGER NOT NULL DEFAULT 0,
                pt_modifier     REAL NOT NULL DEFAULT 1,
                value_no_pot    REAL NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_players_tid ON players(tid);

            CREATE TABLE IF NOT EXISTS player_ratings (
                pid    INTEGER NOT NULL REFERENCES players(pid),
                season INTEGER NOT NULL,
                pos    TEXT NOT NULL,
                ovr    REAL NOT NULL,
                ovrs   TEXT NOT NULL,
                skills TEXT NOT NULL,
                raw    TEXT NOT NULL,
                PRIMARY KEY (pid, season)
            );

            CREATE TABLE IF NOT EXISTS exhibition_rosters (
                season    INTEGER PRIMARY KEY,
                finalized INTEGER NOT NULL DEFAULT 0,
                sides     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS game_attributes (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // League records (write side)
    // ------------------------------------------------------------------

    /// Import teams, team seasons and players in a single transaction.
    /// Existing rows with the same keys are replaced, and each imported
    /// player's rating history is replaced by the imported snapshots.
    pub fn import_league(
        &self,
        teams: &[Team],
        seasons: &[TeamSeason],
        players: &[Player],
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;

        for team in teams {
            insert_team(&tx, team)?;
        }
        for season in seasons {
            insert_team_season(&tx, season)?;
        }
        for player in players {
            insert_player(&tx, player)?;
        }

        tx.commit().context("failed to commit import transaction")?;
        info!(
            teams = teams.len(),
            seasons = seasons.len(),
            players = players.len(),
            "imported league records"
        );
        Ok(())
    }

    pub fn upsert_team(&self, team: &Team) -> Result<()> {
        insert_team(&self.conn(), team)
    }

    pub fn upsert_team_season(&self, season: &TeamSeason) -> Result<()> {
        insert_team_season(&self.conn(), season)
    }

    pub fn upsert_player(&self, player: &Player) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        insert_player(&tx, player)?;
        tx.commit().context("failed to commit player upsert")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // League records (read side)
    // ------------------------------------------------------------------

    pub fn load_team(&self, tid: TeamId) -> Result<Option<Team>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT cid, did, depth FROM teams WHERE tid = ?1",
                params![tid],
                |row| {
                    Ok((
                        row.get::<_, i32>(0)?,
                        row.get::<_, i32>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()
            .context("failed to query team")?;

        let Some((cid, did, depth_json)) = row else {
            return Ok(None);
        };
        let depth = depth_json
            .map(|json| serde_json::from_str::<DepthConfig>(&json))
            .transpose()
            .with_context(|| format!("malformed depth chart for team {tid}"))?;

        Ok(Some(Team { tid, cid, did, depth }))
    }

    pub fn load_team_season(&self, tid: TeamId, season: i32) -> Result<Option<TeamSeason>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT won, lost, tied, health_amount, health_rank
             FROM team_seasons WHERE tid = ?1 AND season = ?2",
            params![tid, season],
            |row| {
                Ok(TeamSeason {
                    tid,
                    season,
                    won: row.get(0)?,
                    lost: row.get(1)?,
                    tied: row.get(2)?,
                    expenses: Expenses {
                        health: BudgetItem {
                            amount: row.get(3)?,
                            rank: row.get(4)?,
                        },
                    },
                })
            },
        )
        .optional()
        .context("failed to query team season")
    }

    /// All players on `tid`, ordered by pid, with their rating history.
    pub fn load_roster(&self, tid: TeamId) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!("{PLAYER_SELECT} WHERE tid = ?1 ORDER BY pid"))
            .context("failed to prepare roster query")?;
        let players = stmt
            .query_map(params![tid], player_from_row)
            .context("failed to query roster")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;

        let mut roster = Vec::with_capacity(players.len());
        for mut p in players {
            p.ratings = load_ratings(&conn, p.pid)?;
            roster.push(p);
        }
        Ok(roster)
    }

    pub fn load_player(&self, pid: PlayerId) -> Result<Option<Player>> {
        let conn = self.conn();
        let player = conn
            .query_row(
                &format!("{PLAYER_SELECT} WHERE pid = ?1"),
                params![pid],
                player_from_row,
            )
            .optional()
            .context("failed to query player")?;

        match player {
            Some(mut p) => {
                p.ratings = load_ratings(&conn, pid)?;
                Ok(Some(p))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // League state (game_attributes)
    // ------------------------------------------------------------------

    const SEASON_KEY: &'static str = "season";
    const PHASE_KEY: &'static str = "phase";
    const USER_TIDS_KEY: &'static str = "user_tids";

    /// Persist an arbitrary JSON value under `key`, replacing any previous
    /// value.
    pub fn save_attribute(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str =
            serde_json::to_string(value).context("failed to serialize attribute value")?;
        conn.execute(
            "INSERT OR REPLACE INTO game_attributes (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save attribute")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`. Returns `None` if the key
    /// does not exist.
    pub fn load_attribute(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let json_str: Option<String> = conn
            .query_row(
                "SELECT value FROM game_attributes WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query game attributes")?;

        json_str
            .map(|s| serde_json::from_str(&s).context("failed to deserialize attribute value"))
            .transpose()
    }

    pub fn save_league_context(&self, league: &LeagueContext) -> Result<()> {
        self.save_attribute(Self::SEASON_KEY, &serde_json::json!(league.season))?;
        self.save_attribute(Self::PHASE_KEY, &serde_json::json!(league.phase.code()))?;
        self.save_attribute(
            Self::USER_TIDS_KEY,
            &serde_json::to_value(&league.user_tids).context("failed to serialize user tids")?,
        )
    }

    /// Read the current season, phase and human-controlled teams.
    ///
    /// The season must have been set; a missing phase reads as the regular
    /// season and missing user teams as none.
    pub fn load_league_context(&self) -> Result<LeagueContext> {
        let Some(season) = self.load_attribute(Self::SEASON_KEY)? else {
            bail!("league state has no season; run `courtside init --season <year>` first");
        };
        let season: i32 = serde_json::from_value(season).context("season is not an integer")?;

        let phase = match self.load_attribute(Self::PHASE_KEY)? {
            Some(value) => {
                let code: i8 = serde_json::from_value(value).context("phase is not an integer")?;
                Phase::from_code(code).with_context(|| format!("unknown phase code {code}"))?
            }
            None => Phase::RegularSeason,
        };

        let user_tids: BTreeSet<TeamId> = match self.load_attribute(Self::USER_TIDS_KEY)? {
            Some(value) => serde_json::from_value(value).context("user_tids is not a list of ids")?,
            None => BTreeSet::new(),
        };

        Ok(LeagueContext::new(season, phase).with_user_tids(user_tids))
    }

    // ------------------------------------------------------------------
    // Exhibition rosters
    // ------------------------------------------------------------------

    pub fn load_exhibition_roster(&self, season: i32) -> Result<Option<ExhibitionRoster>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT finalized, sides FROM exhibition_rosters WHERE season = ?1",
                params![season],
                |row| Ok((row.get::<_, bool>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .context("failed to query exhibition roster")?;

        let Some((finalized, sides_json)) = row else {
            return Ok(None);
        };
        let sides: [Vec<PlayerId>; 2] = serde_json::from_str(&sides_json)
            .with_context(|| format!("malformed exhibition sides for season {season}"))?;

        Ok(Some(ExhibitionRoster {
            season,
            finalized,
            sides,
        }))
    }

    pub fn save_exhibition_roster(&self, roster: &ExhibitionRoster) -> Result<()> {
        let sides = serde_json::to_string(&roster.sides).context("failed to serialize sides")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO exhibition_rosters (season, finalized, sides)
                 VALUES (?1, ?2, ?3)",
                params![roster.season, roster.finalized, sides],
            )
            .context("failed to save exhibition roster")?;
        Ok(())
    }

    /// The season's exhibition roster, inserting an empty unfinalized one
    /// when none exists.
    pub fn exhibition_get_or_create(&self, season: i32) -> Result<ExhibitionRoster> {
        if let Some(roster) = self.load_exhibition_roster(season)? {
            return Ok(roster);
        }
        let roster = ExhibitionRoster {
            season,
            ..ExhibitionRoster::default()
        };
        self.save_exhibition_roster(&roster)?;
        Ok(roster)
    }

    /// Select both exhibition sides if that has not happened yet: the top
    /// `2 * EXHIBITION_SIDE_SIZE` fit players on league teams by
    /// `value_no_pot`, snake-drafted into two sides.
    pub fn exhibition_finalize(&self, season: i32) -> Result<ExhibitionRoster> {
        let roster = self.exhibition_get_or_create(season)?;
        if roster.finalized {
            return Ok(roster);
        }

        let pool: Vec<PlayerId> = {
            let conn = self.conn();
            let mut stmt = conn
                .prepare(
                    "SELECT pid FROM players
                     WHERE tid >= 0 AND games_remaining = 0
                     ORDER BY value_no_pot DESC, pid
                     LIMIT ?1",
                )
                .context("failed to prepare exhibition pool query")?;
            let limit = (2 * EXHIBITION_SIDE_SIZE) as i64;
            let pool: Vec<PlayerId> = stmt
                .query_map(params![limit], |row| row.get(0))
                .context("failed to query exhibition pool")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("failed to map exhibition pool rows")?;
            pool
        };

        let finalized = ExhibitionRoster {
            season,
            finalized: true,
            sides: snake_draft(&pool),
        };
        self.save_exhibition_roster(&finalized)?;
        info!(
            season,
            first = finalized.sides[0].len(),
            second = finalized.sides[1].len(),
            "finalized exhibition roster"
        );
        Ok(finalized)
    }
}

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// JSON columns that fail to decode are malformed records; everything else
/// is a backend failure.
fn store_error(e: anyhow::Error) -> StoreError {
    if e.downcast_ref::<serde_json::Error>().is_some() {
        StoreError::malformed(format!("{e:#}"))
    } else {
        StoreError::backend(format!("{e:#}"))
    }
}

// The store methods run their queries synchronously on the calling task and
// share one connection, so concurrent loads against a `Database` interleave
// at await points but never overlap inside SQLite.
#[async_trait]
impl LeagueStore for Database {
    async fn roster(&self, tid: TeamId) -> Result<Vec<Player>, StoreError> {
        self.load_roster(tid).map_err(store_error)
    }

    async fn team(&self, tid: TeamId) -> Result<Option<Team>, StoreError> {
        self.load_team(tid).map_err(store_error)
    }

    async fn team_season(&self, tid: TeamId, season: i32) -> Result<Option<TeamSeason>, StoreError> {
        self.load_team_season(tid, season).map_err(store_error)
    }

    async fn player(&self, pid: PlayerId) -> Result<Option<Player>, StoreError> {
        self.load_player(pid).map_err(store_error)
    }
}

#[async_trait]
impl ExhibitionRosters for Database {
    async fn get_or_create(&self, season: i32) -> Result<ExhibitionRoster, StoreError> {
        self.exhibition_get_or_create(season).map_err(store_error)
    }

    async fn finalize(&self, season: i32) -> Result<ExhibitionRoster, StoreError> {
        self.exhibition_finalize(season).map_err(store_error)
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

const PLAYER_SELECT: &str = "SELECT pid, tid, first_name, last_name, born_year, injury_type,
        games_remaining, roster_order, pt_modifier, value_no_pot FROM players";

/// Maps a `PLAYER_SELECT` row. Ratings are filled in separately.
fn player_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        pid: row.get(0)?,
        tid: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        born_year: row.get(4)?,
        injury: Injury {
            kind: row.get(5)?,
            games_remaining: row.get(6)?,
        },
        roster_order: row.get(7)?,
        pt_modifier: row.get(8)?,
        value_no_pot: row.get(9)?,
        ratings: Vec::new(),
    })
}

/// Rating snapshots for `pid`, oldest season first.
fn load_ratings(conn: &Connection, pid: PlayerId) -> Result<Vec<PlayerRatingSnapshot>> {
    let mut stmt = conn
        .prepare(
            "SELECT season, pos, ovr, ovrs, skills, raw
             FROM player_ratings WHERE pid = ?1 ORDER BY season",
        )
        .context("failed to prepare ratings query")?;

    let rows = stmt
        .query_map(params![pid], |row| {
            Ok((
                row.get::<_, i32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .context("failed to query ratings")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map rating rows")?;

    rows.into_iter()
        .map(|(season, pos, ovr, ovrs, skills, raw)| {
            let malformed = || format!("malformed ratings for player {pid}, season {season}");
            Ok(PlayerRatingSnapshot {
                season,
                pos,
                ovr,
                ovrs: serde_json::from_str::<BTreeMap<String, f64>>(&ovrs).with_context(malformed)?,
                skills: serde_json::from_str(&skills).with_context(malformed)?,
                raw: serde_json::from_str(&raw).with_context(malformed)?,
            })
        })
        .collect()
}

fn insert_team(conn: &Connection, team: &Team) -> Result<()> {
    let depth = team
        .depth
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context("failed to serialize depth chart")?;
    conn.execute(
        "INSERT INTO teams (tid, cid, did, depth) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(tid) DO UPDATE SET
            cid   = excluded.cid,
            did   = excluded.did,
            depth = excluded.depth",
        params![team.tid, team.cid, team.did, depth],
    )
    .with_context(|| format!("failed to upsert team {}", team.tid))?;
    Ok(())
}

fn insert_team_season(conn: &Connection, ts: &TeamSeason) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO team_seasons
            (tid, season, won, lost, tied, health_amount, health_rank)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            ts.tid,
            ts.season,
            ts.won,
            ts.lost,
            ts.tied,
            ts.expenses.health.amount,
            ts.expenses.health.rank,
        ],
    )
    .with_context(|| format!("failed to upsert season {} for team {}", ts.season, ts.tid))?;
    Ok(())
}

fn insert_player(conn: &Connection, p: &Player) -> Result<()> {
    conn.execute(
        "INSERT INTO players
            (pid, tid, first_name, last_name, born_year, injury_type, games_remaining,
             roster_order, pt_modifier, value_no_pot)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(pid) DO UPDATE SET
            tid             = excluded.tid,
            first_name      = excluded.first_name,
            last_name       = excluded.last_name,
            born_year       = excluded.born_year,
            injury_type     = excluded.injury_type,
            games_remaining = excluded.games_remaining,
            roster_order    = excluded.roster_order,
            pt_modifier     = excluded.pt_modifier,
            value_no_pot    = excluded.value_no_pot",
        params![
            p.pid,
            p.tid,
            p.first_name,
            p.last_name,
            p.born_year,
            p.injury.kind,
            p.injury.games_remaining,
            p.roster_order,
            p.pt_modifier,
            p.value_no_pot,
        ],
    )
    .with_context(|| format!("failed to upsert player {}", p.pid))?;

    conn.execute("DELETE FROM player_ratings WHERE pid = ?1", params![p.pid])
        .context("failed to clear player ratings")?;
    for r in &p.ratings {
        conn.execute(
            "INSERT INTO player_ratings (pid, season, pos, ovr, ovrs, skills, raw)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                p.pid,
                r.season,
                r.pos,
                r.ovr,
                serde_json::to_string(&r.ovrs).context("failed to serialize ovrs")?,
                serde_json::to_string(&r.skills).context("failed to serialize skills")?,
                serde_json::to_string(&r.raw).context("failed to serialize raw ratings")?,
            ],
        )
        .with_context(|| format!("failed to insert ratings for player {}", p.pid))?;
    }
    Ok(())
}

/// Alternate picks between the two sides, reversing direction every round
/// (A, B, B, A, A, B, ...).
fn snake_draft(pool: &[PlayerId]) -> [Vec<PlayerId>; 2] {
    let mut sides: [Vec<PlayerId>; 2] = [Vec::new(), Vec::new()];
    for (i, pid) in pool.iter().enumerate() {
        let round = i / 2;
        let side = if round % 2 == 0 { i % 2 } else { 1 - i % 2 };
        sides[side].push(*pid);
    }
    sides
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::model::RawRatings;
    use serde_json::json;

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory db should open")
    }

    fn team(tid: TeamId) -> Team {
        Team {
            tid,
            cid: 0,
            did: tid % 2,
            depth: None,
        }
    }

    fn season(tid: TeamId, year: i32, rank: f64) -> TeamSeason {
        TeamSeason {
            tid,
            season: year,
            won: 10,
            lost: 5,
            tied: 0,
            expenses: Expenses {
                health: BudgetItem {
                    amount: 1.5,
                    rank,
                },
            },
        }
    }

    fn player(pid: PlayerId, tid: TeamId, value: f64) -> Player {
        let mut raw = RawRatings::new();
        raw.insert("spd".into(), 60.0);
        raw.insert("hgt".into(), 45.0);
        Player {
            pid,
            tid,
            first_name: "Sam".into(),
            last_name: format!("Number{pid}"),
            born_year: 1999,
            ratings: vec![PlayerRatingSnapshot {
                season: 2025,
                pos: "G".into(),
                ovr: 55.0,
                ovrs: BTreeMap::from([("G".to_string(), 55.0)]),
                skills: vec!["B".into()],
                raw,
            }],
            injury: Injury::healthy(),
            roster_order: pid,
            pt_modifier: 1.25,
            value_no_pot: value,
        }
    }

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        for t in ["exhibition_rosters", "game_attributes", "player_ratings", "players", "team_seasons", "teams"] {
            assert!(tables.iter().any(|n| n == t), "missing table {t}");
        }
    }

    #[test]
    fn team_round_trips_with_depth_chart() {
        let db = test_db();
        let mut t = team(3);
        t.depth = Some(BTreeMap::from([("G".to_string(), vec![7, 4])]));
        db.upsert_team(&t).unwrap();

        assert_eq!(db.load_team(3).unwrap(), Some(t));
        assert_eq!(db.load_team(99).unwrap(), None);
    }

    #[test]
    fn team_season_lookup_is_keyed_by_year() {
        let db = test_db();
        db.upsert_team(&team(0)).unwrap();
        db.upsert_team_season(&season(0, 2024, 9.0)).unwrap();
        db.upsert_team_season(&season(0, 2025, 4.0)).unwrap();

        let ts = db.load_team_season(0, 2025).unwrap().unwrap();
        assert_eq!(ts.expenses.health.rank, 4.0);
        assert_eq!(ts.won, 10);
        assert!(db.load_team_season(0, 2026).unwrap().is_none());
    }

    #[test]
    fn player_round_trips_with_ratings() {
        let db = test_db();
        let p = player(12, 1, 70.0);
        db.upsert_player(&p).unwrap();

        let loaded = db.load_player(12).unwrap().unwrap();
        assert_eq!(loaded, p);
        assert!(db.load_player(13).unwrap().is_none());
    }

    #[test]
    fn reimport_replaces_rating_history() {
        let db = test_db();
        let mut p = player(1, 0, 50.0);
        db.upsert_player(&p).unwrap();

        p.ratings[0].ovr = 61.0;
        db.upsert_player(&p).unwrap();

        let loaded = db.load_player(1).unwrap().unwrap();
        assert_eq!(loaded.ratings.len(), 1);
        assert_eq!(loaded.ratings[0].ovr, 61.0);
    }

    #[test]
    fn roster_returns_only_team_players() {
        let db = test_db();
        db.import_league(
            &[team(0), team(1)],
            &[],
            &[player(1, 0, 50.0), player(2, 1, 50.0), player(3, 0, 50.0)],
        )
        .unwrap();

        let pids: Vec<_> = db.load_roster(0).unwrap().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![1, 3]);
        assert!(db.load_roster(5).unwrap().is_empty());
    }

    #[test]
    fn attributes_overwrite_previous_value() {
        let db = test_db();
        assert!(db.load_attribute("missing").unwrap().is_none());
        db.save_attribute("key", &json!(1)).unwrap();
        db.save_attribute("key", &json!({"a": 2})).unwrap();
        assert_eq!(db.load_attribute("key").unwrap(), Some(json!({"a": 2})));
    }

    #[test]
    fn league_context_round_trips() {
        let db = test_db();
        let ctx = LeagueContext::new(2025, Phase::Playoffs).with_user_tids([3, 1]);
        db.save_league_context(&ctx).unwrap();

        let loaded = db.load_league_context().unwrap();
        assert_eq!(loaded.season, 2025);
        assert_eq!(loaded.phase, Phase::Playoffs);
        assert!(loaded.is_user_team(1));
        assert!(loaded.is_user_team(3));
        assert!(!loaded.is_user_team(0));
    }

    #[test]
    fn league_context_requires_season_and_defaults_the_rest() {
        let db = test_db();
        let err = db.load_league_context().unwrap_err();
        assert!(err.to_string().contains("courtside init"));

        db.save_attribute("season", &json!(2030)).unwrap();
        let ctx = db.load_league_context().unwrap();
        assert_eq!(ctx.phase, Phase::RegularSeason);
        assert!(ctx.user_tids.is_empty());

        db.save_attribute("phase", &json!(42)).unwrap();
        assert!(db.load_league_context().is_err());
    }

    #[test]
    fn snake_draft_alternates_direction() {
        let sides = snake_draft(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(sides[0], vec![1, 4, 5]);
        assert_eq!(sides[1], vec![2, 3, 6]);
        assert_eq!(snake_draft(&[]), [Vec::<PlayerId>::new(), Vec::new()]);
    }

    #[tokio::test]
    async fn undecodable_json_column_is_a_malformed_record() {
        let db = test_db();
        db.upsert_team(&team(3)).unwrap();
        db.conn()
            .execute("UPDATE teams SET depth = 'not json' WHERE tid = 3", [])
            .unwrap();

        let err = LeagueStore::team(&db, 3).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)), "got {err:?}");
        assert!(err.to_string().contains("depth chart for team 3"));

        let err = LeagueStore::team_season(&db, 3, 2025).await;
        assert!(matches!(err, Ok(None)));
    }

    #[test]
    fn exhibition_get_or_create_inserts_once() {
        let db = test_db();
        let created = db.exhibition_get_or_create(2025).unwrap();
        assert!(!created.finalized);
        assert!(created.sides.iter().all(|s| s.is_empty()));
        assert_eq!(db.load_exhibition_roster(2025).unwrap(), Some(created));
    }

    #[test]
    fn exhibition_finalize_picks_top_fit_players() {
        let db = test_db();
        let mut players: Vec<Player> = (0..30).map(|pid| player(pid, pid % 3, pid as f64)).collect();
        // Best player is hurt and a free agent is excluded.
        players[29].injury = Injury {
            kind: "Torn ACL".into(),
            games_remaining: 40,
        };
        players[28].tid = -1;
        db.import_league(&[team(0), team(1), team(2)], &[], &players).unwrap();

        let roster = db.exhibition_finalize(2025).unwrap();
        assert!(roster.finalized);
        assert_eq!(roster.sides[0].len(), EXHIBITION_SIDE_SIZE);
        assert_eq!(roster.sides[1].len(), EXHIBITION_SIDE_SIZE);
        assert_eq!(roster.sides[0][0], 27);
        assert_eq!(roster.sides[1][0], 26);
        let all: Vec<_> = roster.sides.iter().flatten().copied().collect();
        assert!(!all.contains(&29));
        assert!(!all.contains(&28));
        assert!(all.contains(&4));
        assert!(!all.contains(&3));

        // A second call returns the stored selection unchanged.
        assert_eq!(db.exhibition_finalize(2025).unwrap(), roster);
    }
}
