// Composite ratings: weighted blends of raw player ratings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::RawRatings;

// ---------------------------------------------------------------------------
// Composite names
// ---------------------------------------------------------------------------

/// Every composite the simulation engine knows about. A league's weight
/// table configures some subset of these, whatever its sport; a table key
/// outside this set is rejected when the rules are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositeRating {
    Pace,
    Usage,
    Dribbling,
    Passing,
    Turnovers,
    ShootingAtRim,
    ShootingLowPost,
    ShootingMidRange,
    ShootingThreePointer,
    #[serde(rename = "shootingFT")]
    ShootingFt,
    Rebounding,
    Stealing,
    Blocking,
    Fouling,
    DrawingFouls,
    Defense,
    DefenseInterior,
    DefensePerimeter,
    Endurance,
    Athleticism,
    JumpBall,
}

/// How a composite reacts to the playoff multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayoffTreatment {
    /// Multiplied by the full multiplier.
    Full,
    /// Negative trait: divided by the multiplier.
    Inverse,
    /// Gets half of the multiplier's deviation from 1.
    Half,
    /// Flat 0.85 regardless of the player.
    Dampened,
}

impl CompositeRating {
    pub const ALL: [CompositeRating; 21] = [
        CompositeRating::Pace,
        CompositeRating::Usage,
        CompositeRating::Dribbling,
        CompositeRating::Passing,
        CompositeRating::Turnovers,
        CompositeRating::ShootingAtRim,
        CompositeRating::ShootingLowPost,
        CompositeRating::ShootingMidRange,
        CompositeRating::ShootingThreePointer,
        CompositeRating::ShootingFt,
        CompositeRating::Rebounding,
        CompositeRating::Stealing,
        CompositeRating::Blocking,
        CompositeRating::Fouling,
        CompositeRating::DrawingFouls,
        CompositeRating::Defense,
        CompositeRating::DefenseInterior,
        CompositeRating::DefensePerimeter,
        CompositeRating::Endurance,
        CompositeRating::Athleticism,
        CompositeRating::JumpBall,
    ];

    /// The config/wire name of this composite (e.g. `"shootingAtRim"`).
    pub fn name(&self) -> &'static str {
        match self {
            CompositeRating::Pace => "pace",
            CompositeRating::Usage => "usage",
            CompositeRating::Dribbling => "dribbling",
            CompositeRating::Passing => "passing",
            CompositeRating::Turnovers => "turnovers",
            CompositeRating::ShootingAtRim => "shootingAtRim",
            CompositeRating::ShootingLowPost => "shootingLowPost",
            CompositeRating::ShootingMidRange => "shootingMidRange",
            CompositeRating::ShootingThreePointer => "shootingThreePointer",
            CompositeRating::ShootingFt => "shootingFT",
            CompositeRating::Rebounding => "rebounding",
            CompositeRating::Stealing => "stealing",
            CompositeRating::Blocking => "blocking",
            CompositeRating::Fouling => "fouling",
            CompositeRating::DrawingFouls => "drawingFouls",
            CompositeRating::Defense => "defense",
            CompositeRating::DefenseInterior => "defenseInterior",
            CompositeRating::DefensePerimeter => "defensePerimeter",
            CompositeRating::Endurance => "endurance",
            CompositeRating::Athleticism => "athleticism",
            CompositeRating::JumpBall => "jumpBall",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == s)
    }

    pub fn playoff_treatment(&self) -> PlayoffTreatment {
        match self {
            CompositeRating::Turnovers | CompositeRating::Fouling => PlayoffTreatment::Inverse,
            CompositeRating::DrawingFouls => PlayoffTreatment::Dampened,
            CompositeRating::Endurance | CompositeRating::Usage => PlayoffTreatment::Half,
            _ => PlayoffTreatment::Full,
        }
    }
}

impl fmt::Display for CompositeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// One input to a composite: either a raw rating looked up by name or a
/// fixed value standing in for one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingComponent {
    Constant(f64),
    Raw(String),
}

impl RatingComponent {
    fn value(&self, ratings: &RawRatings) -> f64 {
        match self {
            RatingComponent::Constant(v) => *v,
            RatingComponent::Raw(name) => ratings.get(name).copied().unwrap_or(0.0),
        }
    }
}

/// Components and their weights for a single composite. Lengths are checked
/// when the weight table is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeight {
    pub ratings: Vec<RatingComponent>,
    pub weights: Vec<f64>,
}

impl CompositeWeight {
    pub fn new(ratings: Vec<RatingComponent>, weights: Vec<f64>) -> Self {
        Self { ratings, weights }
    }

    /// All weights 1.
    pub fn uniform(ratings: Vec<RatingComponent>) -> Self {
        let weights = vec![1.0; ratings.len()];
        Self { ratings, weights }
    }
}

/// Weighted average of the selected raw ratings on a 0–1 scale.
///
/// Each component contributes `value * weight`; the sum is divided by
/// `100 * |weight|` summed over components, then clamped to `[0, 1]`.
/// Negative weights therefore pull the score down without shrinking the
/// denominator. With `round` the result is rounded to two decimals.
pub fn composite_rating(
    ratings: &RawRatings,
    components: &[RatingComponent],
    weights: &[f64],
    round: bool,
) -> f64 {
    let mut total = 0.0;
    let mut divide_by = 0.0;
    for (component, weight) in components.iter().zip(weights) {
        total += component.value(ratings) * weight;
        divide_by += 100.0 * weight.abs();
    }

    if divide_by == 0.0 {
        return 0.0;
    }

    let score = (total / divide_by).clamp(0.0, 1.0);
    if round {
        (score * 100.0).round() / 100.0
    } else {
        score
    }
}

// ---------------------------------------------------------------------------
// Per-player / per-team composite map
// ---------------------------------------------------------------------------

/// Composite scores keyed by name. Built from a weight table so its key set
/// always matches the table's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeRatings(BTreeMap<CompositeRating, f64>);

impl CompositeRatings {
    pub fn from_map(map: BTreeMap<CompositeRating, f64>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: CompositeRating) -> Option<f64> {
        self.0.get(&name).copied()
    }

    pub fn contains(&self, name: CompositeRating) -> bool {
        self.0.contains_key(&name)
    }

    pub fn keys(&self) -> impl Iterator<Item = CompositeRating> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CompositeRating, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CompositeRating, &mut f64)> + '_ {
        self.0.iter_mut().map(|(k, v)| (*k, v))
    }

    /// Apply `f` to one composite if it is present.
    pub fn update(&mut self, name: CompositeRating, f: impl FnOnce(f64) -> f64) {
        if let Some(v) = self.0.get_mut(&name) {
            *v = f(*v);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, f64)]) -> RawRatings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn names(names: &[&str]) -> Vec<RatingComponent> {
        names.iter().map(|n| RatingComponent::Raw(n.to_string())).collect()
    }

    #[test]
    fn single_component_is_rating_over_100() {
        let r = raw(&[("pace", 60.0)]);
        let score = composite_rating(&r, &names(&["pace"]), &[1.0], false);
        assert!((score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn weights_need_not_sum_to_one() {
        let r = raw(&[("hgt", 80.0), ("jmp", 40.0)]);
        // (80*1 + 40*0.25) / (100 * 1.25) = 90 / 125
        let score = composite_rating(&r, &names(&["hgt", "jmp"]), &[1.0, 0.25], false);
        assert!((score - 0.72).abs() < 1e-12);

        // Scaling every weight leaves the score unchanged.
        let scaled = composite_rating(&r, &names(&["hgt", "jmp"]), &[4.0, 1.0], false);
        assert!((score - scaled).abs() < 1e-12);
    }

    #[test]
    fn constant_component_uses_its_value() {
        let r = raw(&[("endu", 70.0)]);
        let components = vec![RatingComponent::Constant(50.0), RatingComponent::Raw("endu".into())];
        let score = composite_rating(&r, &components, &[1.0, 1.0], false);
        assert!((score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn negative_weight_lowers_score_and_result_is_clamped() {
        let r = raw(&[("ins", 0.0), ("pss", 0.0), ("oiq", 100.0)]);
        let components = vec![
            RatingComponent::Constant(50.0),
            RatingComponent::Raw("ins".into()),
            RatingComponent::Raw("pss".into()),
            RatingComponent::Raw("oiq".into()),
        ];
        let score = composite_rating(&r, &components, &[0.5, 1.0, 1.0, -1.0], false);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn missing_raw_rating_reads_as_zero() {
        let r = raw(&[("spd", 90.0)]);
        let score = composite_rating(&r, &names(&["spd", "ghost"]), &[1.0, 1.0], false);
        assert!((score - 0.45).abs() < 1e-12);
    }

    #[test]
    fn round_flag_rounds_to_two_decimals() {
        let r = raw(&[("a", 33.0), ("b", 34.0), ("c", 34.0)]);
        let exact = composite_rating(&r, &names(&["a", "b", "c"]), &[1.0, 1.0, 1.0], false);
        let rounded = composite_rating(&r, &names(&["a", "b", "c"]), &[1.0, 1.0, 1.0], true);
        assert!((exact - 0.336_666).abs() < 1e-5);
        assert_eq!(rounded, 0.34);
    }

    #[test]
    fn names_match_serde_keys() {
        for c in CompositeRating::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.name()));
            assert_eq!(CompositeRating::from_name(c.name()), Some(c));
        }
        assert_eq!(CompositeRating::from_name("flying"), None);
    }

    #[test]
    fn playoff_treatment_by_name() {
        assert_eq!(CompositeRating::Turnovers.playoff_treatment(), PlayoffTreatment::Inverse);
        assert_eq!(CompositeRating::Fouling.playoff_treatment(), PlayoffTreatment::Inverse);
        assert_eq!(CompositeRating::DrawingFouls.playoff_treatment(), PlayoffTreatment::Dampened);
        assert_eq!(CompositeRating::Endurance.playoff_treatment(), PlayoffTreatment::Half);
        assert_eq!(CompositeRating::Usage.playoff_treatment(), PlayoffTreatment::Half);
        assert_eq!(CompositeRating::Pace.playoff_treatment(), PlayoffTreatment::Full);
    }

    #[test]
    fn untagged_component_parses_names_and_numbers() {
        let parsed: Vec<RatingComponent> = serde_json::from_str(r#"[50, "hgt"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![RatingComponent::Constant(50.0), RatingComponent::Raw("hgt".into())]
        );
    }
}
