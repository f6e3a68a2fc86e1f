// Persisted league records (inputs) and simulation-ready records (outputs).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::composite::CompositeRatings;

pub type TeamId = i32;
pub type PlayerId = i32;

/// Raw ratings keyed by name (`"hgt"`, `"spd"`, ...), conventionally 0–100.
pub type RawRatings = BTreeMap<String, f64>;

/// Conference/division id given to exhibition sides.
pub const EXHIBITION_GROUP_ID: i32 = -1;

/// Injury type carried by players who are not hurt.
pub const HEALTHY: &str = "Healthy";

// ---------------------------------------------------------------------------
// Persisted inputs
// ---------------------------------------------------------------------------

/// Ordered player ids per lineup slot (e.g. `"F" -> [12, 4, 9]`).
pub type DepthConfig = BTreeMap<String, Vec<PlayerId>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub tid: TeamId,
    pub cid: i32,
    pub did: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<DepthConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetItem {
    pub amount: f64,
    pub rank: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Expenses {
    pub health: BudgetItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeason {
    pub tid: TeamId,
    pub season: i32,
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub expenses: Expenses,
}

impl TeamSeason {
    /// Zero record used for exhibition sides, ranked first in health spending.
    pub fn exhibition(tid: TeamId, season: i32) -> Self {
        Self {
            tid,
            season,
            won: 0,
            lost: 0,
            tied: 0,
            expenses: Expenses {
                health: BudgetItem {
                    amount: 0.0,
                    rank: 1.0,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Injury {
    #[serde(rename = "type")]
    pub kind: String,
    pub games_remaining: u32,
}

impl Injury {
    pub fn healthy() -> Self {
        Self {
            kind: HEALTHY.to_string(),
            games_remaining: 0,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.kind == HEALTHY
    }
}

impl Default for Injury {
    fn default() -> Self {
        Self::healthy()
    }
}

/// One season's ratings for a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRatingSnapshot {
    pub season: i32,
    pub pos: String,
    pub ovr: f64,
    /// Overall rating as if the player played each listed position.
    #[serde(default)]
    pub ovrs: BTreeMap<String, f64>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(flatten)]
    pub raw: RawRatings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pid: PlayerId,
    pub tid: TeamId,
    pub first_name: String,
    pub last_name: String,
    pub born_year: i32,
    /// Oldest first; only the last entry is used.
    pub ratings: Vec<PlayerRatingSnapshot>,
    #[serde(default)]
    pub injury: Injury,
    pub roster_order: i32,
    pub pt_modifier: f64,
    pub value_no_pot: f64,
}

impl Player {
    pub fn latest_ratings(&self) -> Option<&PlayerRatingSnapshot> {
        self.ratings.last()
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Fit to play in the next game.
    pub fn is_fit(&self) -> bool {
        self.injury.games_remaining == 0
    }
}

/// The two selected sides of an exhibition game, in selection order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExhibitionRoster {
    pub season: i32,
    pub finalized: bool,
    pub sides: [Vec<PlayerId>; 2],
}

// ---------------------------------------------------------------------------
// Simulation-ready outputs
// ---------------------------------------------------------------------------

/// Per-game accumulators for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGameStat {
    #[serde(flatten)]
    pub counters: BTreeMap<String, f64>,
    pub court_time: f64,
    pub bench_time: f64,
    pub energy: f64,
}

/// Per-game accumulators for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamGameStat {
    #[serde(flatten)]
    pub counters: BTreeMap<String, f64>,
    pub pts: f64,
    pub pts_qtrs: Vec<f64>,
}

/// Lineup synergy, filled in by the game engine as lineups change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Synergy {
    pub off: f64,
    pub def: f64,
    pub reb: f64,
}

/// Ordered player ids per lineup slot, restricted to the built roster.
pub type DepthAssignment = BTreeMap<String, Vec<PlayerId>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedPlayerState {
    pub id: PlayerId,
    pub name: String,
    pub age: i32,
    pub pos: String,
    pub value_no_pot: f64,
    pub stat: PlayerGameStat,
    pub composite_rating: CompositeRatings,
    pub skills: Vec<String>,
    pub injury: Injury,
    pub injured: bool,
    pub pt_modifier: f64,
    pub ovrs: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedTeamState {
    pub id: TeamId,
    pub cid: i32,
    pub did: i32,
    pub won: u32,
    pub lost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tied: Option<u32>,
    pub ovr: f64,
    pub stat: TeamGameStat,
    pub player: Vec<ProcessedPlayerState>,
    pub synergy: Synergy,
    pub health_rank: f64,
    pub composite_rating: CompositeRatings,
    pub pace: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<DepthAssignment>,
}
