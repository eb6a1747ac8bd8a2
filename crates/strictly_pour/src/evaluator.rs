//! Session rule evaluation: budgets, win and fail detection, star ratings.

use crate::level::{LevelError, LevelType};
use crate::rules;
use crate::session::{FailReason, Outcome, Remaining, Session};
use tracing::{debug, info, instrument};

/// What changed in a session as a result of one rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Evaluation {
    /// New move counter, when it changed.
    pub moves_remaining: Option<Remaining<u32>>,
    /// New clock counter, when it changed.
    pub time_remaining: Option<Remaining<f64>>,
    /// Terminal result, when one was reached.
    pub outcome: Option<Outcome>,
}

/// Applies the level's rules after pours and clock ticks.
///
/// Does not own timing: elapsed time is reported to it from outside.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionRuleEvaluator;

impl SessionRuleEvaluator {
    /// Classifies a level from its raw budgets.
    ///
    /// # Errors
    ///
    /// Negative or non-finite budgets are malformed level data.
    pub fn detect_level_type(max_moves: i64, time_limit_seconds: f64) -> Result<LevelType, LevelError> {
        LevelType::detect(max_moves, time_limit_seconds)
    }

    /// Accounts for an accepted pour and checks for a terminal outcome.
    ///
    /// Win is checked before the move budget, so solving the puzzle with the
    /// last allowed move is a win.
    #[instrument(skip(session), fields(moves_used = session.moves_used))]
    pub fn on_pour_accepted(session: &mut Session) -> Evaluation {
        let mut evaluation = Evaluation::default();
        if session.outcome.is_some() {
            return evaluation;
        }

        session.moves_used += 1;
        let (remaining, exhausted) = rules::spend_move(session.remaining_moves);
        if session.level_type.move_budget().is_some() {
            session.remaining_moves = remaining;
            evaluation.moves_remaining = Some(remaining);
        }

        if rules::is_solved(&session.tubes) {
            let stars =
                rules::star_rating(session.level_type, session.moves_used, session.time_used);
            info!(%stars, moves_used = session.moves_used, "Level won");
            evaluation.outcome = Some(Outcome::Won {
                stars,
                time_used: session.time_used,
                moves_used: session.moves_used,
            });
        } else if exhausted {
            info!(moves_used = session.moves_used, "Out of moves");
            evaluation.outcome = Some(Outcome::Failed {
                reason: FailReason::OutOfMoves,
            });
        }

        session.outcome = evaluation.outcome;
        evaluation
    }

    /// Accounts for elapsed play time and checks the time budget.
    ///
    /// `elapsed_seconds` must already be validated as finite and non-negative.
    #[instrument(skip(session), fields(time_used = session.time_used))]
    pub fn on_elapsed(session: &mut Session, elapsed_seconds: f64) -> Evaluation {
        let mut evaluation = Evaluation::default();
        if session.outcome.is_some() {
            return evaluation;
        }

        session.time_used += elapsed_seconds;
        if session.level_type.time_budget().is_none() {
            return evaluation;
        }

        let (remaining, exhausted) = rules::spend_time(session.remaining_time, elapsed_seconds);
        if remaining != session.remaining_time {
            session.remaining_time = remaining;
            evaluation.time_remaining = Some(remaining);
        }
        if exhausted {
            info!(time_used = session.time_used, "Out of time");
            evaluation.outcome = Some(Outcome::Failed {
                reason: FailReason::OutOfTime,
            });
            session.outcome = evaluation.outcome;
        } else {
            debug!(?remaining, "Clock advanced");
        }
        evaluation
    }
}
