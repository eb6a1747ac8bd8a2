//! Strictly Pour - rules engine for the color liquid-sort puzzle
//!
//! Tubes hold up to four colored segments. A pour moves the whole top run
//! of one tube onto another, or nothing at all. A level is won when every
//! tube is empty or full of a single color, and may be lost by running out
//! of moves or time.
//!
//! # Architecture
//!
//! - **Tube**: capacity-bounded color stack with run queries
//! - **Level**: raw records, validated definitions, and file catalogs
//! - **PourEngine**: validates and commits a single pour transaction
//! - **SessionRuleEvaluator**: budgets, win/fail detection, star ratings
//! - **SessionController**: selection protocol, state machine, outward events
//!
//! The core is synchronous. Presentation layers subscribe to events and
//! report back through `animation_complete` and `tick`.
//!
//! # Example
//!
//! ```
//! use strictly_pour::{Color, LevelDefinition, LevelRecord, SessionController, SessionOptions};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let red = Color(1);
//! let record = LevelRecord::new(vec![vec![red; 3], vec![red], vec![]]);
//! let level = LevelDefinition::from_record(record)?;
//!
//! let mut controller = SessionController::new(SessionOptions::default());
//! controller.start(level)?;
//! controller.select_tube(0)?;
//! controller.select_tube(1)?;
//!
//! assert!(controller.outcome().is_some_and(|o| o.is_won()));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod catalog;
mod contracts;
mod controller;
mod engine;
mod evaluator;
mod events;
mod invariants;
mod level;
mod session;
mod tube;
mod types;

pub mod rules;

// Crate-level exports - Core types
pub use types::{Color, Pour, PourRecord, PourRequest, Run, TUBE_CAPACITY};
pub use tube::{Tube, TubeError};

// Crate-level exports - Level data
pub use catalog::{LevelCatalog, LevelReport};
pub use level::{LevelDefinition, LevelError, LevelErrorKind, LevelKind, LevelRecord, LevelType};

// Crate-level exports - Pour transaction
pub use contracts::{
    Contract, DestinationAccepts, DistinctTubes, LegalPour, NoPourInFlight, PourContract,
    SessionActive, SourceNotEmpty, TubesUnlocked,
};
pub use engine::{PourEngine, PourRejection, PourResult};

// Crate-level exports - Invariants
pub use invariants::{
    BudgetConsistentInvariant, CapacityInvariant, HistoryConsistentInvariant, Invariant,
    InvariantSet, InvariantViolation, LocksPreserved, SegmentsConserved, SessionInvariants,
    TransitionInvariant,
};

// Crate-level exports - Session and rules
pub use evaluator::{Evaluation, SessionRuleEvaluator};
pub use session::{
    FailReason, LevelResult, Outcome, Remaining, Session, SessionOptions, Stars,
    StarsOutOfRange,
};

// Crate-level exports - Controller
pub use controller::{
    SelectOutcome, SessionController, SessionError, SessionErrorKind, SessionState,
};
pub use events::SessionEvent;
