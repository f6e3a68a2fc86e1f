// Error types shared by the loader, the builders and the store seam.

use std::fmt;

use thiserror::Error;

use crate::model::{PlayerId, TeamId};

/// Which kind of persisted record a lookup was after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Team,
    TeamSeason,
    Player,
    ExhibitionRoster,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Entity::Team => "team",
            Entity::TeamSeason => "team season",
            Entity::Player => "player",
            Entity::ExhibitionRoster => "exhibition roster",
        };
        write!(f, "{s}")
    }
}

/// Failure reported by a store backend. "Not found" is not a store error:
/// stores return `Ok(None)` and the loader decides whether that is fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("stored record is malformed: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Errors that abort a whole `load_team_states` call.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("invalid team request: {0}")]
    InvalidRequest(String),

    #[error("player {pid} has no rating snapshot")]
    MissingRatings { pid: PlayerId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoadError {
    pub fn team_not_found(tid: TeamId) -> Self {
        Self::NotFound {
            entity: Entity::Team,
            id: i64::from(tid),
        }
    }

    pub fn season_not_found(tid: TeamId) -> Self {
        Self::NotFound {
            entity: Entity::TeamSeason,
            id: i64::from(tid),
        }
    }

    pub fn player_not_found(pid: PlayerId) -> Self {
        Self::NotFound {
            entity: Entity::Player,
            id: i64::from(pid),
        }
    }
}

/// Configuration errors raised while validating [`crate::rules::SimRules`].
#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("composite weight table is empty")]
    EmptyCompositeWeights,

    #[error("composite `{name}` has no components")]
    EmptyComposite { name: String },

    #[error("composite `{name}` has {ratings} components but {weights} weights")]
    WeightLengthMismatch {
        name: String,
        ratings: usize,
        weights: usize,
    },

    #[error("composite `{name}` has only zero weights")]
    ZeroWeights { name: String },

    #[error("{which} stat schema is empty")]
    EmptyStatSchema { which: &'static str },
}
