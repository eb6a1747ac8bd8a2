//! Star ratings for won levels.

use crate::level::LevelType;
use crate::session::Stars;
use tracing::instrument;

/// Ratio at or below which a win earns three stars.
pub const THREE_STAR_RATIO: f64 = 0.5;

/// Ratio at or below which a win earns two stars.
pub const TWO_STAR_RATIO: f64 = 0.75;

/// Maps a spent/budget ratio to a rating. Never below one star.
pub fn stars_for_ratio(ratio: f64) -> Stars {
    if ratio <= THREE_STAR_RATIO {
        Stars::THREE
    } else if ratio <= TWO_STAR_RATIO {
        Stars::TWO
    } else {
        Stars::ONE
    }
}

/// Fraction of the rated budget spent; `None` for levels without a budget.
///
/// The move budget is used when the level has one, the time budget otherwise.
pub fn efficiency_ratio(level_type: LevelType, moves_used: u32, time_used: f64) -> Option<f64> {
    match level_type {
        LevelType::Moves { budget } | LevelType::TimerAndMoves { move_budget: budget, .. } => {
            Some(f64::from(moves_used) / f64::from(budget))
        }
        LevelType::Timer { budget } => Some(time_used / budget),
        LevelType::Unlimited => None,
    }
}

/// Rates a win.
///
/// Normal levels always earn three stars.
#[instrument]
pub fn star_rating(level_type: LevelType, moves_used: u32, time_used: f64) -> Stars {
    efficiency_ratio(level_type, moves_used, time_used).map_or(Stars::THREE, stars_for_ratio)
}
