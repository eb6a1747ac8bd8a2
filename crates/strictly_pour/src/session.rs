//! Live state of one level attempt.

use crate::level::{LevelDefinition, LevelError, LevelType};
use crate::tube::Tube;
use crate::types::PourRecord;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// A budget counter that may be unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Remaining<T> {
    /// The level has no such budget.
    Unlimited,
    /// Budget left.
    Limited(T),
}

impl<T: Copy> Remaining<T> {
    /// The remaining amount, if limited.
    pub fn limited(&self) -> Option<T> {
        match self {
            Self::Unlimited => None,
            Self::Limited(v) => Some(*v),
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Remaining<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limited(v) => write!(f, "{}", v),
        }
    }
}

/// Star rating awarded on a win, always within 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "u8")]
#[display("{}", _0)]
pub struct Stars(u8);

/// A star count outside 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("star rating must be between 1 and 3, got {}", value)]
pub struct StarsOutOfRange {
    /// The rejected count.
    pub value: u8,
}

impl TryFrom<u8> for Stars {
    type Error = StarsOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=3 => Ok(Stars(value)),
            _ => Err(StarsOutOfRange { value }),
        }
    }
}

impl Stars {
    /// Lowest rating a win can earn.
    pub const ONE: Stars = Stars(1);
    /// Middle rating.
    pub const TWO: Stars = Stars(2);
    /// Best rating.
    pub const THREE: Stars = Stars(3);

    /// Number of stars, 1 to 3.
    pub fn count(self) -> u8 {
        self.0
    }
}

/// Why a level was lost.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum FailReason {
    /// The move budget ran out before the puzzle was solved.
    OutOfMoves,
    /// The time budget ran out before the puzzle was solved.
    OutOfTime,
}

/// Terminal result of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every tube is empty or uniformly full.
    Won {
        /// Efficiency rating.
        stars: Stars,
        /// Seconds played.
        time_used: f64,
        /// Pours made.
        moves_used: u32,
    },
    /// A budget ran out.
    Failed {
        /// Which budget.
        reason: FailReason,
    },
}

impl Outcome {
    /// The persistable result of a win.
    pub fn result(&self) -> Option<LevelResult> {
        match *self {
            Outcome::Won {
                stars,
                time_used,
                moves_used,
            } => Some(LevelResult {
                stars,
                moves_used,
                time_used_seconds: time_used,
            }),
            Outcome::Failed { .. } => None,
        }
    }

    /// True for a win.
    pub fn is_won(&self) -> bool {
        matches!(self, Outcome::Won { .. })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Won {
                stars,
                time_used,
                moves_used,
            } => write!(
                f,
                "Won with {} stars in {} moves ({:.1}s)",
                stars, moves_used, time_used
            ),
            Outcome::Failed { reason } => write!(f, "Failed: {}", reason),
        }
    }
}

/// What a storage collaborator records for a won level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelResult {
    /// Stars earned.
    pub stars: Stars,
    /// Pours made.
    pub moves_used: u32,
    /// Seconds played.
    pub time_used_seconds: f64,
}

/// Knobs for how a session cooperates with its presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Keep the pour lock held after an accepted pour until the
    /// presentation reports the animation finished.
    pub await_animation: bool,
}

/// State of one attempt at a level.
///
/// Mutated by the pour engine (tubes, lock) and the rule evaluator
/// (counters, outcome); owned by the session controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub(crate) tubes: Vec<Tube>,
    pub(crate) level_type: LevelType,
    pub(crate) remaining_moves: Remaining<u32>,
    pub(crate) remaining_time: Remaining<f64>,
    pub(crate) moves_used: u32,
    pub(crate) time_used: f64,
    pub(crate) selected: Option<usize>,
    pub(crate) pour_in_flight: bool,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) history: Vec<PourRecord>,
}

impl Session {
    /// Starts a fresh attempt at `level`.
    ///
    /// # Errors
    ///
    /// Fails only if the level's tubes cannot be built.
    #[instrument(skip(level), fields(tubes = level.tube_count(), kind = %level.level_type().kind()))]
    pub fn new(level: &LevelDefinition) -> Result<Self, LevelError> {
        let tubes = level.build_tubes()?;
        let level_type = *level.level_type();
        let remaining_moves = level_type
            .move_budget()
            .map_or(Remaining::Unlimited, Remaining::Limited);
        let remaining_time = level_type
            .time_budget()
            .map_or(Remaining::Unlimited, Remaining::Limited);

        info!("Session initialized");
        Ok(Self {
            tubes,
            level_type,
            remaining_moves,
            remaining_time,
            moves_used: 0,
            time_used: 0.0,
            selected: None,
            pour_in_flight: false,
            outcome: None,
            history: Vec::new(),
        })
    }

    /// The live tubes.
    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    /// Level type fixed at session start.
    pub fn level_type(&self) -> LevelType {
        self.level_type
    }

    /// Pours left before the level fails.
    pub fn remaining_moves(&self) -> Remaining<u32> {
        self.remaining_moves
    }

    /// Seconds left before the level fails.
    pub fn remaining_time(&self) -> Remaining<f64> {
        self.remaining_time
    }

    /// Accepted pours so far.
    pub fn moves_used(&self) -> u32 {
        self.moves_used
    }

    /// Seconds played so far.
    pub fn time_used(&self) -> f64 {
        self.time_used
    }

    /// Tube picked by the first click of a pour gesture.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether a pour is still being presented.
    pub fn pour_in_flight(&self) -> bool {
        self.pour_in_flight
    }

    /// Terminal result, once reached.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Accepted pours in order.
    pub fn history(&self) -> &[PourRecord] {
        &self.history
    }

    /// True once the attempt is won or failed.
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, tube) in self.tubes.iter().enumerate() {
            let marker = if self.selected == Some(index) { '>' } else { ' ' };
            writeln!(f, "{}{:>2} {}", marker, index, tube)?;
        }
        write!(
            f,
            "moves left: {}  time left: {}",
            self.remaining_moves,
            match self.remaining_time {
                Remaining::Unlimited => "unlimited".to_string(),
                Remaining::Limited(t) => format!("{:.1}s", t),
            }
        )
    }
}
