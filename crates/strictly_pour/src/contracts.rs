//! Contract-based validation for pours.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P} pour {Q}. Preconditions are checked on every request, in a fixed
//! order where the first failure wins; postconditions run in debug builds.

use crate::engine::PourRejection;
use crate::invariants::{
    CapacityInvariant, Invariant, InvariantViolation, LocksPreserved, SegmentsConserved,
    TransitionInvariant,
};
use crate::session::Session;
use crate::tube::Tube;
use crate::types::{PourRequest, Run};
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// What a satisfied precondition yields for the transition to use.
    type Checked;

    /// Why a precondition refused the action.
    type Rejection;

    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<Self::Checked, Self::Rejection>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), Vec<InvariantViolation>>;
}

// ─────────────────────────────────────────────────────────────
//  Pour Preconditions
// ─────────────────────────────────────────────────────────────

/// Looks up a tube, treating a missing one as an invalid request.
fn tube(session: &Session, index: usize) -> Result<&Tube, PourRejection> {
    session.tubes().get(index).ok_or(PourRejection::Invalid)
}

/// Precondition: the session has not reached an outcome.
pub struct SessionActive;

impl SessionActive {
    /// Rejects with [`PourRejection::SessionOver`] once won or failed.
    pub fn check(_request: &PourRequest, session: &Session) -> Result<(), PourRejection> {
        if session.is_over() {
            Err(PourRejection::SessionOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: source and destination are two different, existing tubes.
pub struct DistinctTubes;

impl DistinctTubes {
    /// Rejects with [`PourRejection::Invalid`].
    pub fn check(request: &PourRequest, session: &Session) -> Result<(), PourRejection> {
        let count = session.tubes().len();
        if request.source == request.dest || request.source >= count || request.dest >= count {
            Err(PourRejection::Invalid)
        } else {
            Ok(())
        }
    }
}

/// Precondition: neither tube is locked.
pub struct TubesUnlocked;

impl TubesUnlocked {
    /// Rejects with [`PourRejection::TubeLocked`], or `Invalid` for a missing tube.
    pub fn check(request: &PourRequest, session: &Session) -> Result<(), PourRejection> {
        let source = tube(session, request.source)?;
        let dest = tube(session, request.dest)?;
        if source.is_locked() || dest.is_locked() {
            Err(PourRejection::TubeLocked)
        } else {
            Ok(())
        }
    }
}

/// Precondition: no other pour is still in flight.
pub struct NoPourInFlight;

impl NoPourInFlight {
    /// Rejects with [`PourRejection::Busy`].
    pub fn check(_request: &PourRequest, session: &Session) -> Result<(), PourRejection> {
        if session.pour_in_flight() {
            Err(PourRejection::Busy)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the source has something to pour.
pub struct SourceNotEmpty;

impl SourceNotEmpty {
    /// Returns the source's top run, or rejects with [`PourRejection::SourceEmpty`].
    pub fn check(request: &PourRequest, session: &Session) -> Result<Run, PourRejection> {
        tube(session, request.source)?
            .top_run()
            .ok_or(PourRejection::SourceEmpty)
    }
}

/// Precondition: the destination can take the whole run.
pub struct DestinationAccepts;

impl DestinationAccepts {
    /// Rejects with [`PourRejection::Rejected`]; runs are never split.
    pub fn check(request: &PourRequest, run: Run, session: &Session) -> Result<(), PourRejection> {
        if tube(session, request.dest)?.can_accept(run.color, run.count) {
            Ok(())
        } else {
            Err(PourRejection::Rejected)
        }
    }
}

/// Composite precondition: all checks, in order, first failure wins.
pub struct LegalPour;

impl LegalPour {
    /// Validates a pour request and returns the run it would move.
    #[instrument(skip(session))]
    pub fn check(request: &PourRequest, session: &Session) -> Result<Run, PourRejection> {
        SessionActive::check(request, session)?;
        DistinctTubes::check(request, session)?;
        TubesUnlocked::check(request, session)?;
        NoPourInFlight::check(request, session)?;
        let run = SourceNotEmpty::check(request, session)?;
        DestinationAccepts::check(request, run, session)?;
        Ok(run)
    }
}

// ─────────────────────────────────────────────────────────────
//  Pour Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for pour actions.
///
/// Preconditions: see [`LegalPour`].
///
/// Postconditions:
/// - No tube exceeds capacity
/// - Segments per color are conserved
/// - Lock flags are unchanged
pub struct PourContract;

impl Contract<Session, PourRequest> for PourContract {
    type Checked = Run;
    type Rejection = PourRejection;

    fn pre(session: &Session, request: &PourRequest) -> Result<Run, PourRejection> {
        LegalPour::check(request, session)
    }

    fn post(before: &Session, after: &Session) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            CapacityInvariant::check(after),
            SegmentsConserved::check(before, after),
            LocksPreserved::check(before, after),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            warn!(?violations, "Pour postcondition failed");
            Err(violations)
        }
    }
}
