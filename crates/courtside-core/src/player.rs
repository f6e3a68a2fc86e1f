// Builds one player's simulation record from the persisted player.

use crate::composite::CompositeRating;
use crate::context::Phase;
use crate::error::LoadError;
use crate::model::{Player, PlayerGameStat, ProcessedPlayerState};
use crate::playoffs::apply_playoff_adjustment;
use crate::rules::SimRules;

/// Exponent applied to usage under basketball-like rulesets.
pub const USAGE_EXPONENT: f64 = 1.9;

/// Playing-time modifier that leaves the rotation untouched.
pub const NEUTRAL_PT_MODIFIER: f64 = 1.0;

/// Energy at tip-off.
pub const FULL_ENERGY: f64 = 1.0;

/// League state one player build depends on.
#[derive(Debug, Clone, Copy)]
pub struct PlayerBuildContext<'a> {
    pub rules: &'a SimRules,
    pub season: i32,
    pub phase: Phase,
    /// Whether the owning team is run by a human.
    pub user_controlled: bool,
}

/// Build the simulation record for `player`.
///
/// Composite ratings come from the latest rating snapshot. In the playoffs
/// they get the playoff adjustment; afterwards, basketball-like rulesets
/// raise usage to [`USAGE_EXPONENT`].
pub fn build_player(
    player: &Player,
    ctx: &PlayerBuildContext<'_>,
) -> Result<ProcessedPlayerState, LoadError> {
    let rating = player
        .latest_ratings()
        .ok_or(LoadError::MissingRatings { pid: player.pid })?;

    let mut composite_rating = ctx.rules.composite_weights.compute(&rating.raw);

    if ctx.phase.is_playoffs() {
        apply_playoff_adjustment(&mut composite_rating, rating.ovr);
    }

    if ctx.rules.sport.is_basketball_like() {
        composite_rating.update(CompositeRating::Usage, |u| u.powf(USAGE_EXPONENT));
    }

    let pt_modifier = if ctx.user_controlled {
        player.pt_modifier
    } else {
        NEUTRAL_PT_MODIFIER
    };

    Ok(ProcessedPlayerState {
        id: player.pid,
        name: player.name(),
        age: ctx.season - player.born_year,
        pos: rating.pos.clone(),
        value_no_pot: player.value_no_pot,
        stat: PlayerGameStat {
            counters: ctx.rules.player_stat_template().clone(),
            court_time: 0.0,
            bench_time: 0.0,
            energy: FULL_ENERGY,
        },
        composite_rating,
        skills: rating.skills.clone(),
        injury: player.injury.clone(),
        injured: !player.injury.is_healthy(),
        pt_modifier,
        ovrs: rating.ovrs.clone(),
    })
}
