// Pluggable league computations the builders delegate to: team overall,
// health-spending rank, and depth-chart assignment.

use std::sync::Arc;

use crate::model::{DepthAssignment, DepthConfig, PlayerId, ProcessedPlayerState, TeamSeason};

/// What the team-overall aggregation sees of one fit player.
#[derive(Debug, Clone, PartialEq)]
pub struct OvrInput {
    pub pid: PlayerId,
    pub pos: String,
    pub ovr: f64,
}

pub trait TeamOvr: Send + Sync {
    fn team_ovr(&self, players: &[OvrInput]) -> f64;
}

pub trait HealthRank: Send + Sync {
    /// Rank (1 = spends most) given a team's seasons, oldest first.
    fn health_rank(&self, seasons: &[TeamSeason]) -> f64;
}

pub trait DepthChart: Send + Sync {
    fn assign(&self, config: &DepthConfig, players: &[ProcessedPlayerState]) -> DepthAssignment;
}

// ---------------------------------------------------------------------------
// Default implementations
// ---------------------------------------------------------------------------

/// Team overall from a margin-of-victory regression on the ten best players.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovRegressionOvr;

impl MovRegressionOvr {
    const INTERCEPT: f64 = -124.13;
    const WEIGHT: f64 = 0.4417;
    const DECAY: f64 = -0.1905;
    const DEPTH: usize = 10;
}

impl TeamOvr for MovRegressionOvr {
    fn team_ovr(&self, players: &[OvrInput]) -> f64 {
        let mut ovrs: Vec<f64> = players.iter().map(|p| p.ovr).collect();
        ovrs.sort_by(|a, b| b.total_cmp(a));
        ovrs.resize(Self::DEPTH.max(ovrs.len()), 0.0);

        let predicted_mov = Self::INTERCEPT
            + ovrs
                .iter()
                .take(Self::DEPTH)
                .enumerate()
                .map(|(i, ovr)| Self::WEIGHT * (Self::DECAY * i as f64).exp() * ovr)
                .sum::<f64>();

        // -15..+15 MOV onto 0..100
        let raw = predicted_mov * 50.0 / 15.0 + 50.0;
        raw.round().max(0.0)
    }
}

/// Weighted rank over the last three seasons, newest weighted 3:2:1.
#[derive(Debug, Clone, Copy)]
pub struct LastThreeSeasonsRank {
    pub num_teams: usize,
}

impl HealthRank for LastThreeSeasonsRank {
    fn health_rank(&self, seasons: &[TeamSeason]) -> f64 {
        let rank = |i: usize| seasons[i].expenses.health.rank;
        let s = seasons.len();
        match s {
            0 => self.num_teams as f64 / 2.0,
            1 => rank(0),
            2 => (3.0 * rank(1) + 2.0 * rank(0)) / 5.0,
            _ => (3.0 * rank(s - 1) + 2.0 * rank(s - 2) + rank(s - 3)) / 6.0,
        }
    }
}

/// Keeps each slot's configured order, dropping ids not on the roster.
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterDepthChart;

impl DepthChart for RosterDepthChart {
    fn assign(&self, config: &DepthConfig, players: &[ProcessedPlayerState]) -> DepthAssignment {
        config
            .iter()
            .map(|(slot, pids)| {
                let present = pids
                    .iter()
                    .copied()
                    .filter(|pid| players.iter().any(|p| p.id == *pid))
                    .collect();
                (slot.clone(), present)
            })
            .collect()
    }
}

/// The set of collaborators handed to the team builder.
#[derive(Clone)]
pub struct Collaborators {
    pub ovr: Arc<dyn TeamOvr>,
    pub health: Arc<dyn HealthRank>,
    pub depth: Arc<dyn DepthChart>,
}

impl Collaborators {
    pub fn standard(num_teams: usize) -> Self {
        Self {
            ovr: Arc::new(MovRegressionOvr),
            health: Arc::new(LastThreeSeasonsRank { num_teams }),
            depth: Arc::new(RosterDepthChart),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
