// In-memory store, used for tests and for callers that already hold the
// league in memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ExhibitionRosters, LeagueStore};
use crate::error::StoreError;
use crate::model::{ExhibitionRoster, Player, PlayerId, Team, TeamId, TeamSeason};

#[derive(Debug, Default)]
pub struct MemoryStore {
    teams: HashMap<TeamId, Team>,
    seasons: HashMap<(TeamId, i32), TeamSeason>,
    players: HashMap<PlayerId, Player>,
    exhibition: Mutex<HashMap<i32, ExhibitionRoster>>,
    finalize_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.insert(team.tid, team);
        self
    }

    pub fn with_season(mut self, season: TeamSeason) -> Self {
        self.seasons.insert((season.tid, season.season), season);
        self
    }

    pub fn with_player(mut self, player: Player) -> Self {
        self.players.insert(player.pid, player);
        self
    }

    pub fn with_players(mut self, players: impl IntoIterator<Item = Player>) -> Self {
        for p in players {
            self.players.insert(p.pid, p);
        }
        self
    }

    pub fn with_exhibition(self, roster: ExhibitionRoster) -> Self {
        self.exhibition_guard().insert(roster.season, roster);
        self
    }

    /// How many times `finalize` has run.
    pub fn finalize_calls(&self) -> usize {
        self.finalize_calls.load(Ordering::SeqCst)
    }

    fn exhibition_guard(&self) -> std::sync::MutexGuard<'_, HashMap<i32, ExhibitionRoster>> {
        self.exhibition.lock().expect("exhibition mutex poisoned")
    }
}

#[async_trait]
impl LeagueStore for MemoryStore {
    async fn roster(&self, tid: TeamId) -> Result<Vec<Player>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self
            .players
            .values()
            .filter(|p| p.tid == tid)
            .cloned()
            .collect())
    }

    async fn team(&self, tid: TeamId) -> Result<Option<Team>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.teams.get(&tid).cloned())
    }

    async fn team_season(&self, tid: TeamId, season: i32) -> Result<Option<TeamSeason>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.seasons.get(&(tid, season)).cloned())
    }

    async fn player(&self, pid: PlayerId) -> Result<Option<Player>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.players.get(&pid).cloned())
    }
}

#[async_trait]
impl ExhibitionRosters for MemoryStore {
    async fn get_or_create(&self, season: i32) -> Result<ExhibitionRoster, StoreError> {
        let mut guard = self.exhibition_guard();
        let roster = guard.entry(season).or_insert_with(|| ExhibitionRoster {
            season,
            ..ExhibitionRoster::default()
        });
        Ok(roster.clone())
    }

    async fn finalize(&self, season: i32) -> Result<ExhibitionRoster, StoreError> {
        self.finalize_calls.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.exhibition_guard();
        let roster = guard.entry(season).or_insert_with(|| ExhibitionRoster {
            season,
            ..ExhibitionRoster::default()
        });
        roster.finalized = true;
        Ok(roster.clone())
    }
}
