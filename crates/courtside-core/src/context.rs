// League state threaded explicitly into the loader and builders.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::TeamId;

/// Stage of the league calendar. The numeric codes are the ones persisted
/// in league state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ExpansionDraft,
    FantasyDraft,
    Preseason,
    RegularSeason,
    AfterTradeDeadline,
    Playoffs,
    DraftLottery,
    Draft,
    AfterDraft,
    ResignPlayers,
    FreeAgency,
}

impl Phase {
    pub fn code(&self) -> i8 {
        match self {
            Phase::ExpansionDraft => -2,
            Phase::FantasyDraft => -1,
            Phase::Preseason => 0,
            Phase::RegularSeason => 1,
            Phase::AfterTradeDeadline => 2,
            Phase::Playoffs => 3,
            Phase::DraftLottery => 4,
            Phase::Draft => 5,
            Phase::AfterDraft => 6,
            Phase::ResignPlayers => 7,
            Phase::FreeAgency => 8,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -2 => Some(Phase::ExpansionDraft),
            -1 => Some(Phase::FantasyDraft),
            0 => Some(Phase::Preseason),
            1 => Some(Phase::RegularSeason),
            2 => Some(Phase::AfterTradeDeadline),
            3 => Some(Phase::Playoffs),
            4 => Some(Phase::DraftLottery),
            5 => Some(Phase::Draft),
            6 => Some(Phase::AfterDraft),
            7 => Some(Phase::ResignPlayers),
            8 => Some(Phase::FreeAgency),
            _ => None,
        }
    }

    /// Phase during which composite ratings get the playoff multiplier.
    pub fn is_playoffs(&self) -> bool {
        matches!(self, Phase::Playoffs)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::ExpansionDraft => "expansion draft",
            Phase::FantasyDraft => "fantasy draft",
            Phase::Preseason => "preseason",
            Phase::RegularSeason => "regular season",
            Phase::AfterTradeDeadline => "after trade deadline",
            Phase::Playoffs => "playoffs",
            Phase::DraftLottery => "draft lottery",
            Phase::Draft => "draft",
            Phase::AfterDraft => "after draft",
            Phase::ResignPlayers => "re-sign players",
            Phase::FreeAgency => "free agency",
        };
        write!(f, "{s}")
    }
}

/// Which ruleset the league runs under. The sport only switches the usage
/// emphasis; every sport configures its composites from the names in
/// [`crate::composite::CompositeRating`], which follow basketball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Basketball,
    Football,
    Hockey,
}

impl Sport {
    pub fn from_str_sport(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "basketball" => Some(Sport::Basketball),
            "football" => Some(Sport::Football),
            "hockey" => Some(Sport::Hockey),
            _ => None,
        }
    }

    /// Basketball-like rulesets get the non-linear usage emphasis.
    pub fn is_basketball_like(&self) -> bool {
        matches!(self, Sport::Basketball)
    }
}

/// Per-invocation league state: current season, phase, and the teams run by
/// a human.
#[derive(Debug, Clone)]
pub struct LeagueContext {
    pub season: i32,
    pub phase: Phase,
    pub user_tids: BTreeSet<TeamId>,
}

impl LeagueContext {
    pub fn new(season: i32, phase: Phase) -> Self {
        Self {
            season,
            phase,
            user_tids: BTreeSet::new(),
        }
    }

    pub fn with_user_tids(mut self, tids: impl IntoIterator<Item = TeamId>) -> Self {
        self.user_tids.extend(tids);
        self
    }

    pub fn is_user_team(&self, tid: TeamId) -> bool {
        self.user_tids.contains(&tid)
    }
}
