// Post-season "tryhard" multiplier applied to composite ratings.

use crate::composite::{CompositeRatings, PlayoffTreatment};

/// Flat factor applied to foul drawing in the playoffs.
pub const DRAWING_FOULS_PLAYOFF_FACTOR: f64 = 0.85;

/// Multiplier for a player with overall rating `ovr`.
///
/// Piecewise: a flat 1.01 below 45, two cubic segments on `[45, 60)` and
/// `[60, 75]`, and a flat 1.2 above 75. The segments do not meet exactly at
/// 45 or 75. Inputs matching no branch (NaN) get 1.0.
pub fn playoff_multiplier(ovr: f64) -> f64 {
    let mut y = 0.0;
    if ovr < 45.0 {
        y = 0.01;
    } else if (45.0..60.0).contains(&ovr) {
        y = 0.000_106_666_7 * ovr.powi(3) - 0.0158 * ovr.powi(2) + 0.780_333_333_3 * ovr - 12.83;
    } else if (60.0..=75.0).contains(&ovr) {
        y = 0.000_026_666_7 * ovr.powi(3) - 0.0056 * ovr.powi(2) + 0.393_333_333_3 * ovr - 9.05;
    } else if ovr > 75.0 {
        y = 0.2;
    }
    1.0 + y
}

/// Adjust every composite in `composites` for a player rated `ovr`.
pub fn apply_playoff_adjustment(composites: &mut CompositeRatings, ovr: f64) {
    let multiplier = playoff_multiplier(ovr);
    for (name, value) in composites.iter_mut() {
        match name.playoff_treatment() {
            PlayoffTreatment::Inverse => *value /= multiplier,
            PlayoffTreatment::Dampened => *value *= DRAWING_FOULS_PLAYOFF_FACTOR,
            PlayoffTreatment::Half => *value *= 1.0 + (multiplier - 1.0) / 2.0,
            PlayoffTreatment::Full => *value *= multiplier,
        }
    }
}
