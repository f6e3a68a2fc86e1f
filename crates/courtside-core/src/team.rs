// Builds one team's simulation record: record, overall, roster, pace.

use tracing::{debug, warn};

use crate::collaborators::{Collaborators, OvrInput};
use crate::composite::CompositeRating;
use crate::context::LeagueContext;
use crate::error::LoadError;
use crate::model::{
    Player, ProcessedPlayerState, ProcessedTeamState, Synergy, Team, TeamGameStat, TeamSeason,
};
use crate::player::{build_player, PlayerBuildContext};
use crate::request::TeamRequest;
use crate::rules::SimRules;

/// Roster players (in order) whose pace feeds the team pace.
pub const PACE_PLAYERS: usize = 7;

/// Team pace when the pace composite averages zero.
pub const PACE_BASE: f64 = 100.0;

/// Team pace gained per unit of average pace composite.
pub const PACE_SCALE: f64 = 15.0;

/// Exhibition games run faster than league games.
pub const EXHIBITION_PACE_FACTOR: f64 = 1.15;

/// Shared, read-only inputs for every team in one load.
#[derive(Debug, Clone, Copy)]
pub struct TeamBuildContext<'a> {
    pub rules: &'a SimRules,
    pub league: &'a LeagueContext,
    pub collaborators: &'a Collaborators,
}

/// The fetched records for one requested team.
#[derive(Debug, Clone)]
pub struct TeamInputs {
    pub request: TeamRequest,
    pub team: Team,
    pub season: TeamSeason,
    /// Roster order for regular teams is applied by the builder; exhibition
    /// sides are kept in selection order.
    pub players: Vec<Player>,
}

pub fn build_team(
    inputs: TeamInputs,
    ctx: &TeamBuildContext<'_>,
) -> Result<ProcessedTeamState, LoadError> {
    let TeamInputs {
        request,
        team,
        season,
        mut players,
    } = inputs;
    let exhibition = request.is_exhibition();
    let tid = request.tid();

    if !exhibition {
        players.sort_by_key(|p| p.roster_order);
    }

    let ovr = team_ovr(&players, ctx.collaborators)?;

    let player_ctx = PlayerBuildContext {
        rules: ctx.rules,
        season: ctx.league.season,
        phase: ctx.league.phase,
        user_controlled: ctx.league.is_user_team(tid),
    };
    let built: Vec<ProcessedPlayerState> = players
        .iter()
        .map(|p| build_player(p, &player_ctx))
        .collect::<Result<_, _>>()?;

    let depth = team
        .depth
        .as_ref()
        .map(|config| ctx.collaborators.depth.assign(config, &built));

    let mut pace = aggregate_pace(tid, &built);
    if exhibition {
        pace *= EXHIBITION_PACE_FACTOR;
    }

    let health_rank = ctx.collaborators.health.health_rank(std::slice::from_ref(&season));

    debug!(
        tid,
        players = built.len(),
        ovr,
        pace,
        exhibition,
        "built team state"
    );

    Ok(ProcessedTeamState {
        id: tid,
        cid: team.cid,
        did: team.did,
        won: season.won,
        lost: season.lost,
        tied: ctx.rules.ties.then_some(season.tied),
        ovr,
        stat: TeamGameStat {
            counters: ctx.rules.team_stat_template().clone(),
            pts: 0.0,
            pts_qtrs: vec![0.0],
        },
        player: built,
        synergy: Synergy::default(),
        health_rank,
        composite_rating: ctx.rules.composite_weights.zeroed(),
        pace,
        depth,
    })
}

/// Team overall from the players with no games left to miss.
fn team_ovr(players: &[Player], collaborators: &Collaborators) -> Result<f64, LoadError> {
    let fit = players
        .iter()
        .filter(|p| p.is_fit())
        .map(|p| {
            let rating = p
                .latest_ratings()
                .ok_or(LoadError::MissingRatings { pid: p.pid })?;
            Ok(OvrInput {
                pid: p.pid,
                pos: rating.pos.clone(),
                ovr: rating.ovr,
            })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;
    Ok(collaborators.ovr.team_ovr(&fit))
}

/// `PACE_BASE + PACE_SCALE * mean pace composite` over the first
/// [`PACE_PLAYERS`] players. An empty roster gets [`PACE_BASE`].
pub fn aggregate_pace(tid: i32, players: &[ProcessedPlayerState]) -> f64 {
    let considered = &players[..players.len().min(PACE_PLAYERS)];
    if considered.is_empty() {
        warn!(tid, "no players to average pace over; using base pace");
        return PACE_BASE;
    }

    let total: f64 = considered
        .iter()
        .map(|p| p.composite_rating.get(CompositeRating::Pace).unwrap_or(0.0))
        .sum();
    let mean = total / considered.len() as f64;
    mean * PACE_SCALE + PACE_BASE
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::collaborators::TeamOvr;
    use crate::context::Phase;
    use crate::model::{Injury, EXHIBITION_GROUP_ID};
    use crate::player::test_support::{pace_rules, player};
    use crate::request::ExhibitionSide;

    fn team(tid: i32) -> Team {
        Team {
            tid,
            cid: 0,
            did: 1,
            depth: None,
        }
    }

    fn season(tid: i32) -> TeamSeason {
        let mut ts = TeamSeason::exhibition(tid, 2025);
        ts.won = 10;
        ts.lost = 4;
        ts.tied = 2;
        ts.expenses.health.rank = 12.0;
        ts
    }

    fn paced(pid: i32, roster_order: i32, pace: f64) -> Player {
        let mut p = player(pid, 0, 50.0, &[("pace", pace)]);
        p.roster_order = roster_order;
        p
    }

    fn inputs(players: Vec<Player>) -> TeamInputs {
        TeamInputs {
            request: TeamRequest::Regular(0),
            team: team(0),
            season: season(0),
            players,
        }
    }

    fn build(inputs: TeamInputs, rules: &SimRules, league: &LeagueContext) -> ProcessedTeamState {
        let collaborators = Collaborators::standard(30);
        let ctx = TeamBuildContext {
            rules,
            league,
            collaborators: &collaborators,
        };
        build_team(inputs, &ctx).unwrap()
    }

    /// Sums fit players' ovr so a test can see exactly who was counted.
    struct SumOvr;

    impl TeamOvr for SumOvr {
        fn team_ovr(&self, players: &[OvrInput]) -> f64 {
            players.iter().map(|p| p.ovr).sum()
        }
    }

    #[test]
    fn regular_roster_sorted_by_roster_order() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let players = vec![paced(10, 2, 50.0), paced(11, 0, 50.0), paced(12, 1, 50.0)];

        let t = build(inputs(players), &rules, &league);
        let ids: Vec<_> = t.player.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![11, 12, 10]);
    }

    #[test]
    fn exhibition_roster_keeps_selection_order() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let players = vec![paced(10, 2, 50.0), paced(11, 0, 50.0), paced(12, 1, 50.0)];
        let mut inp = inputs(players);
        inp.request = TeamRequest::ExhibitionSide(ExhibitionSide::First);

        let t = build(inp, &rules, &league);
        let ids: Vec<_> = t.player.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(t.id, -1);
    }

    #[test]
    fn copies_record_and_health_rank() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let t = build(inputs(vec![paced(1, 0, 50.0)]), &rules, &league);

        assert_eq!((t.won, t.lost), (10, 4));
        assert_eq!(t.tied, None);
        assert_eq!(t.health_rank, 12.0);
        assert_eq!((t.cid, t.did), (0, 1));
        assert_eq!(t.synergy, Synergy::default());
    }

    #[test]
    fn tied_reported_only_when_league_tracks_ties() {
        let mut rules = pace_rules();
        rules.ties = true;
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let t = build(inputs(vec![paced(1, 0, 50.0)]), &rules, &league);
        assert_eq!(t.tied, Some(2));
    }

    #[test]
    fn injured_players_do_not_count_toward_ovr() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let collaborators = Collaborators {
            ovr: Arc::new(SumOvr),
            ..Collaborators::standard(30)
        };
        let ctx = TeamBuildContext {
            rules: &rules,
            league: &league,
            collaborators: &collaborators,
        };

        let mut hurt = player(3, 0, 70.0, &[("pace", 50.0)]);
        hurt.injury = Injury {
            kind: "Broken Wrist".into(),
            games_remaining: 5,
        };
        let healthy = vec![player(1, 0, 50.0, &[]), player(2, 0, 60.0, &[])];
        let mut with_hurt = healthy.clone();
        with_hurt.push(hurt);

        let a = build_team(inputs(healthy), &ctx).unwrap();
        let b = build_team(inputs(with_hurt), &ctx).unwrap();
        assert_eq!(a.ovr, 110.0);
        assert_eq!(a.ovr, b.ovr);
        // The injured player is still on the roster.
        assert_eq!(b.player.len(), 3);
    }

    #[test]
    fn pace_is_mean_of_first_seven_rescaled() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        // First seven (by roster order) have pace 60, the rest 0.
        let mut players: Vec<_> = (0..7).map(|i| paced(i, i, 60.0)).collect();
        players.extend((7..12).map(|i| paced(i, i, 0.0)));

        let t = build(inputs(players), &rules, &league);
        assert!((t.pace - 109.0).abs() < 1e-9);
    }

    #[test]
    fn exhibition_pace_is_regular_pace_times_factor() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let players: Vec<_> = [80.0, 70.0, 60.0].iter().enumerate().map(|(i, v)| paced(i as i32, i as i32, *v)).collect();

        let regular = build(inputs(players.clone()), &rules, &league);
        let mut inp = inputs(players);
        inp.request = TeamRequest::ExhibitionSide(ExhibitionSide::Second);
        let exhibition = build(inp, &rules, &league);

        assert!((regular.pace - 110.5).abs() < 1e-9);
        assert!((exhibition.pace - regular.pace * EXHIBITION_PACE_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn empty_roster_gets_base_pace() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let t = build(inputs(vec![]), &rules, &league);
        assert_eq!(t.pace, PACE_BASE);
        assert!(t.player.is_empty());
        assert_eq!(t.ovr, 0.0);
    }

    #[test]
    fn team_composites_and_stat_are_zeroed() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let t = build(inputs(vec![paced(1, 0, 99.0)]), &rules, &league);

        assert_eq!(t.composite_rating.get(CompositeRating::Pace), Some(0.0));
        assert_eq!(t.composite_rating.len(), 1);
        assert_eq!(t.stat.pts, 0.0);
        assert_eq!(t.stat.pts_qtrs, vec![0.0]);
        assert_eq!(t.stat.counters.get("fg"), Some(&0.0));
        assert!(!t.stat.counters.contains_key("pts"));
    }

    #[test]
    fn depth_assigned_only_when_configured() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let players = vec![paced(1, 0, 50.0), paced(2, 1, 50.0)];

        let t = build(inputs(players.clone()), &rules, &league);
        assert!(t.depth.is_none());

        let mut inp = inputs(players);
        inp.team.depth = Some(BTreeMap::from([("G".to_string(), vec![2, 99, 1])]));
        let t = build(inp, &rules, &league);
        assert_eq!(t.depth.unwrap().get("G"), Some(&vec![2, 1]));
    }

    #[test]
    fn user_team_keeps_pt_modifier() {
        let rules = pace_rules();
        let mut p = paced(1, 0, 50.0);
        p.pt_modifier = 0.75;

        let ai = build(inputs(vec![p.clone()]), &rules, &LeagueContext::new(2025, Phase::RegularSeason));
        assert_eq!(ai.player[0].pt_modifier, 1.0);

        let league = LeagueContext::new(2025, Phase::RegularSeason).with_user_tids([0]);
        let human = build(inputs(vec![p]), &rules, &league);
        assert_eq!(human.player[0].pt_modifier, 0.75);
    }

    #[test]
    fn exhibition_group_ids_come_from_team_record() {
        let rules = pace_rules();
        let league = LeagueContext::new(2025, Phase::RegularSeason);
        let mut inp = inputs(vec![paced(1, 0, 50.0)]);
        inp.request = TeamRequest::ExhibitionSide(ExhibitionSide::First);
        inp.team = Team {
            tid: -1,
            cid: EXHIBITION_GROUP_ID,
            did: EXHIBITION_GROUP_ID,
            depth: None,
        };
        let t = build(inp, &rules, &league);
        assert_eq!((t.cid, t.did), (-1, -1));
    }
}
