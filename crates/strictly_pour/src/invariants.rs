//! First-class invariants for a puzzle session.
//!
//! Invariants are logical properties that must hold throughout play.
//! They are testable independently and checked in debug builds after
//! every accepted pour.

use crate::session::{Remaining, Session};
use crate::types::TUBE_CAPACITY;
use derive_more::Display;
use std::collections::BTreeMap;

/// A property of a single session snapshot.
pub trait Invariant<S> {
    /// Human-readable statement of the property.
    const DESCRIPTION: &'static str;

    /// Whether the property holds for `state`.
    fn holds(state: &S) -> bool;

    /// Like [`Invariant::holds`], but reports the failure as a value.
    fn check(state: &S) -> Result<(), InvariantViolation> {
        if Self::holds(state) {
            Ok(())
        } else {
            Err(InvariantViolation::new(Self::DESCRIPTION))
        }
    }
}

/// A property relating the session before and after one pour.
pub trait TransitionInvariant<S> {
    /// Human-readable statement of the property.
    const DESCRIPTION: &'static str;

    /// Whether the property holds across the transition.
    fn holds(before: &S, after: &S) -> bool;

    /// Like [`TransitionInvariant::holds`], but reports the failure as a value.
    fn check(before: &S, after: &S) -> Result<(), InvariantViolation> {
        if Self::holds(before, after) {
            Ok(())
        } else {
            Err(InvariantViolation::new(Self::DESCRIPTION))
        }
    }
}

/// A broken invariant, named by its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("invariant violated: {}", description)]
pub struct InvariantViolation {
    /// Which property failed.
    pub description: &'static str,
}

impl InvariantViolation {
    /// Wraps an invariant description.
    pub fn new(description: &'static str) -> Self {
        Self { description }
    }
}

/// Several invariants checked as one, reporting every failure.
///
/// Implemented for tuples of up to four [`Invariant`]s.
pub trait InvariantSet<S> {
    /// Every violated member, in tuple order.
    fn violations(state: &S) -> Vec<InvariantViolation>;

    /// `Ok` when no member is violated.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations = Self::violations(state);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

macro_rules! impl_invariant_set {
    ($($member:ident),+) => {
        impl<S, $($member: Invariant<S>),+> InvariantSet<S> for ($($member,)+) {
            fn violations(state: &S) -> Vec<InvariantViolation> {
                [$($member::check(state)),+]
                    .into_iter()
                    .filter_map(Result::err)
                    .collect()
            }
        }
    };
}

impl_invariant_set!(A);
impl_invariant_set!(A, B);
impl_invariant_set!(A, B, C);
impl_invariant_set!(A, B, C, D);

/// Invariant: no tube holds more than its capacity.
pub struct CapacityInvariant;

impl Invariant<Session> for CapacityInvariant {
    const DESCRIPTION: &'static str = "Tubes never exceed capacity";

    fn holds(session: &Session) -> bool {
        session
            .tubes()
            .iter()
            .all(|t| t.segments().len() <= TUBE_CAPACITY)
    }
}

/// Invariant: every counted move has a history entry.
pub struct HistoryConsistentInvariant;

impl Invariant<Session> for HistoryConsistentInvariant {
    const DESCRIPTION: &'static str = "Move counter matches pour history";

    fn holds(session: &Session) -> bool {
        session.history().len() == session.moves_used() as usize
    }
}

/// Invariant: remaining budgets agree with what has been spent.
pub struct BudgetConsistentInvariant;

impl Invariant<Session> for BudgetConsistentInvariant {
    const DESCRIPTION: &'static str = "Remaining budgets agree with the level type and counters";

    fn holds(session: &Session) -> bool {
        let level_type = session.level_type();
        let moves_ok = match (level_type.move_budget(), session.remaining_moves()) {
            (None, Remaining::Unlimited) => true,
            (Some(budget), Remaining::Limited(left)) => {
                left == budget.saturating_sub(session.moves_used())
            }
            _ => false,
        };
        let time_ok = match (level_type.time_budget(), session.remaining_time()) {
            (None, Remaining::Unlimited) => true,
            (Some(budget), Remaining::Limited(left)) => left >= 0.0 && left <= budget,
            _ => false,
        };
        moves_ok && time_ok
    }
}

/// All single-state session invariants as a composable set.
pub type SessionInvariants = (
    CapacityInvariant,
    HistoryConsistentInvariant,
    BudgetConsistentInvariant,
);

/// Transition property: a pour moves segments, it never creates or destroys them.
pub struct SegmentsConserved;

impl TransitionInvariant<Session> for SegmentsConserved {
    const DESCRIPTION: &'static str = "Segments per color are conserved by a pour";

    fn holds(before: &Session, after: &Session) -> bool {
        color_histogram(before) == color_histogram(after)
    }
}

/// Transition property: lock flags never change during play.
pub struct LocksPreserved;

impl TransitionInvariant<Session> for LocksPreserved {
    const DESCRIPTION: &'static str = "Tube locks are fixed for the whole attempt";

    fn holds(before: &Session, after: &Session) -> bool {
        before.tubes().len() == after.tubes().len()
            && before
                .tubes()
                .iter()
                .zip(after.tubes())
                .all(|(a, b)| a.is_locked() == b.is_locked())
    }
}

fn color_histogram(session: &Session) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for color in session.tubes().iter().flat_map(|t| t.segments()) {
        *counts.entry(color.index()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LevelDefinition, LevelRecord};
    use crate::types::{Color, Pour, PourRecord};

    fn session() -> Session {
        let record = LevelRecord::new(vec![vec![Color(1), Color(1)], vec![Color(2)], vec![]])
            .with_max_moves(4);
        Session::new(&LevelDefinition::from_record(record).unwrap()).unwrap()
    }

    #[test]
    fn test_invariant_set_holds_for_fresh_session() {
        assert!(SessionInvariants::check_all(&session()).is_ok());
    }

    #[test]
    fn test_history_mismatch_detected() {
        let mut s = session();
        s.history
            .push(PourRecord::new(Pour::new(0, 2, Color(1), 2), 0.0));
        let violations = SessionInvariants::check_all(&s).unwrap_err();
        assert_eq!(
            violations,
            vec![InvariantViolation::new(HistoryConsistentInvariant::DESCRIPTION)]
        );
        assert_eq!(
            violations[0].to_string(),
            "invariant violated: Move counter matches pour history"
        );
    }

    #[test]
    fn test_segment_conservation() {
        let before = session();
        let mut after = before.clone();
        assert!(SegmentsConserved::holds(&before, &after));

        after.tubes[2].push(Color(3), 1).unwrap();
        assert_eq!(
            SegmentsConserved::check(&before, &after),
            Err(InvariantViolation::new(SegmentsConserved::DESCRIPTION))
        );
        assert!(LocksPreserved::holds(&before, &after));
    }

    #[test]
    fn test_single_and_quad_sets() {
        type Single = (CapacityInvariant,);
        type Quad = (
            CapacityInvariant,
            HistoryConsistentInvariant,
            BudgetConsistentInvariant,
            CapacityInvariant,
        );
        let mut s = session();
        assert!(Single::check_all(&s).is_ok());

        s.moves_used = 1;
        let violations = Quad::violations(&s);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].description, HistoryConsistentInvariant::DESCRIPTION);
        assert_eq!(violations[1].description, BudgetConsistentInvariant::DESCRIPTION);
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (CapacityInvariant, HistoryConsistentInvariant);
        assert!(TwoInvariants::check_all(&session()).is_ok());
    }
}
