// Entry point: fetch everything a set of teams needs and build their
// simulation-ready states.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::info;

use crate::collaborators::Collaborators;
use crate::context::LeagueContext;
use crate::error::LoadError;
use crate::model::{
    ExhibitionRoster, Player, PlayerId, ProcessedTeamState, Team, TeamId, TeamSeason,
    EXHIBITION_GROUP_ID,
};
use crate::request::{ExhibitionSide, TeamRequest};
use crate::rules::SimRules;
use crate::store::{ExhibitionRosters, LeagueStore};
use crate::team::{build_team, TeamBuildContext, TeamInputs};

/// Team states keyed by team id.
pub type TeamStates = BTreeMap<TeamId, ProcessedTeamState>;

pub struct TeamStateLoader {
    store: Arc<dyn LeagueStore>,
    exhibition: Arc<dyn ExhibitionRosters>,
    rules: Arc<SimRules>,
    collaborators: Collaborators,
}

impl TeamStateLoader {
    pub fn new(
        store: Arc<dyn LeagueStore>,
        exhibition: Arc<dyn ExhibitionRosters>,
        rules: Arc<SimRules>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            store,
            exhibition,
            rules,
            collaborators,
        }
    }

    /// Build the state of every requested team.
    ///
    /// Requesting exactly the two exhibition ids builds the exhibition game's
    /// sides; otherwise every id must be a league team. All fetches run
    /// concurrently. Any missing record fails the whole call; the result
    /// always holds one entry per requested id.
    pub async fn load_team_states(
        &self,
        league: &LeagueContext,
        tids: &[TeamId],
    ) -> Result<TeamStates, LoadError> {
        let requests = TeamRequest::resolve(tids)?;
        let exhibition = requests.iter().any(TeamRequest::is_exhibition);
        info!(
            teams = requests.len(),
            exhibition,
            season = league.season,
            phase = %league.phase,
            "loading team states"
        );

        let ctx = TeamBuildContext {
            rules: &self.rules,
            league,
            collaborators: &self.collaborators,
        };

        let states = if exhibition {
            let roster = self.exhibition_roster(league.season).await?;
            try_join_all(requests.iter().filter_map(|r| match r {
                TeamRequest::ExhibitionSide(side) => Some(self.load_exhibition_side(*side, &roster, &ctx)),
                TeamRequest::Regular(_) => None,
            }))
            .await?
        } else {
            try_join_all(requests.iter().map(|r| self.load_regular(r.tid(), &ctx))).await?
        };

        Ok(states.into_iter().map(|t| (t.id, t)).collect())
    }

    async fn load_regular(
        &self,
        tid: TeamId,
        ctx: &TeamBuildContext<'_>,
    ) -> Result<ProcessedTeamState, LoadError> {
        let (players, team, season) = tokio::try_join!(
            self.fetch_roster(tid),
            self.fetch_team(tid),
            self.fetch_season(tid, ctx.league.season),
        )?;

        build_team(
            TeamInputs {
                request: TeamRequest::Regular(tid),
                team,
                season,
                players,
            },
            ctx,
        )
    }

    async fn load_exhibition_side(
        &self,
        side: ExhibitionSide,
        roster: &ExhibitionRoster,
        ctx: &TeamBuildContext<'_>,
    ) -> Result<ProcessedTeamState, LoadError> {
        let pids = &roster.sides[side.index()];
        let players = try_join_all(pids.iter().map(|pid| self.fetch_player(*pid))).await?;

        let tid = side.tid();
        build_team(
            TeamInputs {
                request: TeamRequest::ExhibitionSide(side),
                team: Team {
                    tid,
                    cid: EXHIBITION_GROUP_ID,
                    did: EXHIBITION_GROUP_ID,
                    depth: None,
                },
                season: TeamSeason::exhibition(tid, ctx.league.season),
                players,
            },
            ctx,
        )
    }

    /// The season's exhibition roster, finalizing selection first if needed.
    async fn exhibition_roster(&self, season: i32) -> Result<ExhibitionRoster, LoadError> {
        let roster = self.exhibition.get_or_create(season).await?;
        if roster.finalized {
            return Ok(roster);
        }
        info!(season, "exhibition roster not finalized; finalizing");
        Ok(self.exhibition.finalize(season).await?)
    }

    async fn fetch_roster(&self, tid: TeamId) -> Result<Vec<Player>, LoadError> {
        Ok(self.store.roster(tid).await?)
    }

    async fn fetch_team(&self, tid: TeamId) -> Result<Team, LoadError> {
        self.store
            .team(tid)
            .await?
            .ok_or_else(|| LoadError::team_not_found(tid))
    }

    async fn fetch_season(&self, tid: TeamId, season: i32) -> Result<TeamSeason, LoadError> {
        self.store
            .team_season(tid, season)
            .await?
            .ok_or_else(|| LoadError::season_not_found(tid))
    }

    async fn fetch_player(&self, pid: PlayerId) -> Result<Player, LoadError> {
        self.store
            .player(pid)
            .await?
            .ok_or_else(|| LoadError::player_not_found(pid))
    }
}
