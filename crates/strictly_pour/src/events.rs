//! Outward events consumed by presentation and storage collaborators.

use crate::engine::PourRejection;
use crate::level::LevelKind;
use crate::session::{FailReason, Remaining, Stars};
use crate::types::Color;
use serde::{Deserialize, Serialize};

/// Something the session wants its collaborators to know about.
///
/// Events are buffered in emission order; see
/// [`SessionController::drain_events`](crate::SessionController::drain_events).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A level attempt began (initial load or restart).
    LevelStarted {
        /// Tubes in the level.
        tube_count: usize,
        /// Constraint kind.
        kind: LevelKind,
    },
    /// First click of a pour gesture landed on a tube.
    TubeSelected {
        /// Selected tube.
        index: usize,
    },
    /// The selected tube was clicked again.
    TubeDeselected {
        /// Previously selected tube.
        index: usize,
    },
    /// An empty tube was clicked with nothing selected.
    SelectionRejected {
        /// Clicked tube.
        index: usize,
    },
    /// A pour was committed.
    PourAccepted {
        /// Tube poured from.
        source_index: usize,
        /// Tube poured into.
        dest_index: usize,
        /// Color moved.
        color: Color,
        /// Segments moved.
        count: usize,
    },
    /// A pour was refused; nothing changed.
    PourRejected {
        /// Tube poured from.
        source_index: usize,
        /// Tube poured into.
        dest_index: usize,
        /// Why it was refused.
        reason: PourRejection,
    },
    /// The move counter changed.
    MovesRemainingChanged {
        /// Pours left.
        remaining: Remaining<u32>,
    },
    /// The clock counter changed.
    TimeRemainingChanged {
        /// Seconds left.
        remaining: Remaining<f64>,
    },
    /// The puzzle was solved.
    LevelWon {
        /// Efficiency rating.
        stars: Stars,
        /// Seconds played.
        time_used_seconds: f64,
        /// Pours made.
        moves_used: u32,
    },
    /// A budget ran out.
    LevelFailed {
        /// Which budget.
        reason: FailReason,
    },
}

impl SessionEvent {
    /// True for the two terminal events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LevelWon { .. } | Self::LevelFailed { .. })
    }
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LevelStarted { tube_count, kind } => {
                write!(f, "level started: {} tubes, {}", tube_count, kind)
            }
            Self::TubeSelected { index } => write!(f, "tube {} selected", index),
            Self::TubeDeselected { index } => write!(f, "tube {} deselected", index),
            Self::SelectionRejected { index } => write!(f, "tube {} is empty", index),
            Self::PourAccepted {
                source_index,
                dest_index,
                color,
                count,
            } => write!(
                f,
                "poured {} x{} from {} into {}",
                color, count, source_index, dest_index
            ),
            Self::PourRejected {
                source_index,
                dest_index,
                reason,
            } => write!(
                f,
                "cannot pour {} into {}: {}",
                source_index, dest_index, reason
            ),
            Self::MovesRemainingChanged { remaining } => write!(f, "moves left: {}", remaining),
            Self::TimeRemainingChanged { remaining } => match remaining {
                Remaining::Unlimited => write!(f, "time left: unlimited"),
                Remaining::Limited(t) => write!(f, "time left: {:.1}s", t),
            },
            Self::LevelWon {
                stars,
                time_used_seconds,
                moves_used,
            } => write!(
                f,
                "level won: {} stars, {} moves, {:.1}s",
                stars, moves_used, time_used_seconds
            ),
            Self::LevelFailed { reason } => write!(f, "level failed: {}", reason),
        }
    }
}
