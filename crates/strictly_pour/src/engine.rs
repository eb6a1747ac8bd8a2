//! The pour transaction: validate, then move a whole top run between tubes.

use crate::contracts::{Contract, PourContract};
use crate::session::Session;
use crate::tube::{Tube, TubeError};
use crate::types::{Pour, PourRecord, PourRequest, Run};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

/// Why a pour was refused. Refusals are normal gameplay, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PourRejection {
    /// The attempt is already won or failed.
    #[display("the level is over")]
    SessionOver,
    /// Source and destination are the same tube, or not tubes at all.
    #[display("source and destination must be two different tubes")]
    Invalid,
    /// One of the tubes is locked.
    #[display("tube is locked")]
    TubeLocked,
    /// Another pour is still being presented.
    #[display("a pour is already in progress")]
    Busy,
    /// Nothing to pour.
    #[display("source tube is empty")]
    SourceEmpty,
    /// Destination cannot take the whole run.
    #[display("destination cannot take the run")]
    Rejected,
}

/// Result of a pour attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PourResult {
    /// The run moved; state is committed.
    Accepted(Pour),
    /// Nothing changed.
    Rejected(PourRejection),
}

impl PourResult {
    /// True when the pour was committed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, PourResult::Accepted(_))
    }

    /// The committed pour, if any.
    pub fn pour(&self) -> Option<Pour> {
        match self {
            PourResult::Accepted(pour) => Some(*pour),
            PourResult::Rejected(_) => None,
        }
    }
}

/// Validates and executes single pours against a session.
///
/// The transaction is synchronous: by the time [`PourEngine::try_pour`]
/// returns, the tubes are either untouched or fully updated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PourEngine;

impl PourEngine {
    /// Attempts to pour the top run of `source` into `dest`.
    ///
    /// Rejections leave the session exactly as it was. Accepted pours are
    /// appended to the session history; counters are left to the rule evaluator.
    #[instrument(skip(session), fields(moves_used = session.moves_used()))]
    pub fn try_pour(session: &mut Session, source: usize, dest: usize) -> PourResult {
        let request = PourRequest::new(source, dest);

        let run = match PourContract::pre(session, &request) {
            Ok(run) => run,
            Err(reason) => {
                debug!(%reason, "Pour rejected");
                return PourResult::Rejected(reason);
            }
        };

        #[cfg(debug_assertions)]
        let before = session.clone();

        session.pour_in_flight = true;
        let transferred = Self::transfer(&mut session.tubes, source, dest);
        session.pour_in_flight = false;

        let run = match transferred {
            Ok(moved) => {
                debug_assert_eq!(moved, run, "transferred run differs from validated run");
                moved
            }
            Err(e) => {
                error!(error = %e, "Validated pour failed to transfer");
                return PourResult::Rejected(PourRejection::Rejected);
            }
        };

        #[cfg(debug_assertions)]
        debug_assert!(
            PourContract::post(&before, session).is_ok(),
            "pour postcondition violated"
        );

        let pour = Pour::new(source, dest, run.color, run.count);
        session
            .history
            .push(PourRecord::new(pour, session.time_used));
        debug!(%pour, "Pour accepted");
        PourResult::Accepted(pour)
    }

    /// Moves the top run of `source` onto `dest`, or nothing at all.
    fn transfer(tubes: &mut [Tube], source: usize, dest: usize) -> Result<Run, TubeError> {
        let run = tubes[source].pop_run()?;
        if let Err(e) = tubes[dest].push(run.color, run.count) {
            tubes[source].push(run.color, run.count)?;
            return Err(e);
        }
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LevelDefinition, LevelRecord};
    use crate::types::Color;

    fn session(tubes: Vec<Vec<u8>>) -> Session {
        let tubes = tubes
            .into_iter()
            .map(|t| t.into_iter().map(Color).collect())
            .collect();
        Session::new(&LevelDefinition::from_record(LevelRecord::new(tubes)).unwrap()).unwrap()
    }

    #[test]
    fn test_accepted_pour_moves_whole_run() {
        let mut s = session(vec![vec![2, 1, 1], vec![1]]);
        let result = PourEngine::try_pour(&mut s, 0, 1);
        assert_eq!(result, PourResult::Accepted(Pour::new(0, 1, Color(1), 2)));
        assert_eq!(s.tubes()[0].segments(), &[Color(2)]);
        assert_eq!(s.tubes()[1].segments(), &[Color(1); 3]);
        assert_eq!(s.history().len(), 1);
        assert!(!s.pour_in_flight());
    }

    #[test]
    fn test_run_too_long_is_rejected_not_split() {
        let mut s = session(vec![vec![1, 1, 1], vec![1, 1]]);
        let before = s.clone();
        let result = PourEngine::try_pour(&mut s, 0, 1);
        assert_eq!(result, PourResult::Rejected(PourRejection::Rejected));
        assert_eq!(s, before);
    }

    #[test]
    fn test_transfer_restores_source_on_failure() {
        let mut tubes = vec![
            Tube::new(vec![Color(1), Color(1)], false).unwrap(),
            Tube::new(vec![Color(1), Color(1), Color(1)], false).unwrap(),
        ];
        let err = PourEngine::transfer(&mut tubes, 0, 1).unwrap_err();
        assert_eq!(
            err,
            TubeError::CapacityExceeded {
                requested: 2,
                free: 1
            }
        );
        assert_eq!(tubes[0].segments(), &[Color(1), Color(1)]);
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(PourRejection::SourceEmpty.to_string(), "source tube is empty");
    }
}
