//! Win detection.

use crate::tube::Tube;
use tracing::instrument;

/// Checks whether the puzzle is solved.
///
/// Every tube must be empty, or full and a single color. A full tube with
/// mixed colors does not count.
#[instrument(skip(tubes), fields(tubes = tubes.len()))]
pub fn is_solved(tubes: &[Tube]) -> bool {
    tubes.iter().all(Tube::is_solved)
}
