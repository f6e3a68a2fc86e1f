// League-wide static configuration: composite weight table, stat schemas,
// ruleset flags. Validated once and shared read-only by every build.

use std::collections::BTreeMap;

use crate::composite::{composite_rating, CompositeRating, CompositeRatings, CompositeWeight};
use crate::context::Sport;
use crate::error::RulesError;
use crate::model::RawRatings;

/// Player stats that never appear in the per-game counters: `gp` is tracked
/// outside the game, the rest are dedicated fields of the accumulator.
const PLAYER_STAT_EXCLUDED: [&str; 4] = ["gp", "courtTime", "benchTime", "energy"];

/// Team stats held in dedicated accumulator fields.
const TEAM_STAT_EXCLUDED: [&str; 2] = ["pts", "ptsQtrs"];

/// Player stats every accumulator starts with, whatever the schema says.
const PLAYER_STAT_BASE: [&str; 2] = ["gs", "min"];

// ---------------------------------------------------------------------------
// Composite weight table
// ---------------------------------------------------------------------------

/// Validated composite weight table. Non-empty, and every entry has matching
/// component/weight lengths with at least one nonzero weight.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeWeights(BTreeMap<CompositeRating, CompositeWeight>);

impl CompositeWeights {
    pub fn new(table: BTreeMap<CompositeRating, CompositeWeight>) -> Result<Self, RulesError> {
        if table.is_empty() {
            return Err(RulesError::EmptyCompositeWeights);
        }
        for (name, weight) in &table {
            if weight.ratings.is_empty() {
                return Err(RulesError::EmptyComposite {
                    name: name.to_string(),
                });
            }
            if weight.ratings.len() != weight.weights.len() {
                return Err(RulesError::WeightLengthMismatch {
                    name: name.to_string(),
                    ratings: weight.ratings.len(),
                    weights: weight.weights.len(),
                });
            }
            if weight.weights.iter().all(|w| *w == 0.0) {
                return Err(RulesError::ZeroWeights {
                    name: name.to_string(),
                });
            }
        }
        Ok(Self(table))
    }

    pub fn get(&self, name: CompositeRating) -> Option<&CompositeWeight> {
        self.0.get(&name)
    }

    pub fn contains(&self, name: CompositeRating) -> bool {
        self.0.contains_key(&name)
    }

    pub fn names(&self) -> impl Iterator<Item = CompositeRating> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every configured composite for one set of raw ratings.
    pub fn compute(&self, ratings: &RawRatings) -> CompositeRatings {
        let map = self
            .0
            .iter()
            .map(|(name, w)| (*name, composite_rating(ratings, &w.ratings, &w.weights, false)))
            .collect();
        CompositeRatings::from_map(map)
    }

    /// Same key set, all zero.
    pub fn zeroed(&self) -> CompositeRatings {
        CompositeRatings::from_map(self.0.keys().map(|name| (*name, 0.0)).collect())
    }
}

// ---------------------------------------------------------------------------
// Stat schemas
// ---------------------------------------------------------------------------

/// Names of the per-game counters the engine accumulates.
#[derive(Debug, Clone, PartialEq)]
pub struct StatSchema {
    names: Vec<String>,
}

impl StatSchema {
    pub fn new(names: Vec<String>, which: &'static str) -> Result<Self, RulesError> {
        if names.is_empty() {
            return Err(RulesError::EmptyStatSchema { which });
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn zeroed(&self) -> BTreeMap<String, f64> {
        self.names.iter().map(|n| (n.clone(), 0.0)).collect()
    }
}

// ---------------------------------------------------------------------------
// Assembled rules
// ---------------------------------------------------------------------------

/// Everything a build needs that does not change between games.
#[derive(Debug, Clone)]
pub struct SimRules {
    pub sport: Sport,
    /// Whether standings track tied games.
    pub ties: bool,
    pub composite_weights: CompositeWeights,
    player_stat_template: BTreeMap<String, f64>,
    team_stat_template: BTreeMap<String, f64>,
}

impl SimRules {
    pub fn new(
        sport: Sport,
        ties: bool,
        composite_weights: CompositeWeights,
        player_stats: StatSchema,
        team_stats: StatSchema,
    ) -> Self {
        let mut player_stat_template: BTreeMap<String, f64> =
            PLAYER_STAT_BASE.iter().map(|s| (s.to_string(), 0.0)).collect();
        player_stat_template.extend(
            player_stats
                .zeroed()
                .into_iter()
                .filter(|(name, _)| !PLAYER_STAT_EXCLUDED.contains(&name.as_str())),
        );
        let team_stat_template = team_stats
            .zeroed()
            .into_iter()
            .filter(|(name, _)| !TEAM_STAT_EXCLUDED.contains(&name.as_str()))
            .collect();

        Self {
            sport,
            ties,
            composite_weights,
            player_stat_template,
            team_stat_template,
        }
    }

    /// Zeroed player counters: `gs`, `min`, then the schema minus `gp`.
    pub fn player_stat_template(&self) -> &BTreeMap<String, f64> {
        &self.player_stat_template
    }

    pub fn team_stat_template(&self) -> &BTreeMap<String, f64> {
        &self.team_stat_template
    }
}
