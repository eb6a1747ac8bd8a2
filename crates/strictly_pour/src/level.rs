//! Level data: raw records as read from disk and validated definitions.

use crate::tube::Tube;
use crate::types::{Color, TUBE_CAPACITY};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Raw level record as stored in a level file.
///
/// Nothing here is trusted; [`LevelDefinition::from_record`] validates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_")]
pub struct LevelRecord {
    /// Initial contents of each tube, bottom to top.
    pub tubes: Vec<Vec<Color>>,
    /// Declared number of initially empty tubes. Informational only.
    #[serde(default)]
    pub empty_tube_count: usize,
    /// Move budget; 0 means unlimited.
    #[serde(default)]
    pub max_moves: i64,
    /// Time budget in seconds; 0 means unlimited.
    #[serde(default)]
    pub time_limit_seconds: f64,
    /// Indices of tubes that cannot be poured from or into.
    #[serde(default)]
    pub locked_tubes: Vec<usize>,
    /// Swap power-ups granted for the level.
    #[serde(default)]
    pub available_swaps: u32,
    /// Opaque modifier tags.
    #[serde(default)]
    pub twists: Vec<String>,
}

impl LevelRecord {
    /// Creates an unlimited record with the given tube contents.
    pub fn new(tubes: Vec<Vec<Color>>) -> Self {
        let empty_tube_count = tubes.iter().filter(|t| t.is_empty()).count();
        Self {
            tubes,
            empty_tube_count,
            ..Self::default()
        }
    }
}

/// Label for the four kinds of level constraints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum LevelKind {
    /// No move or time limit.
    Normal,
    /// Time limit only.
    Timer,
    /// Move limit only.
    Moves,
    /// Both limits, enforced independently.
    TimerAndMoves,
}

/// A level's constraints, carrying only the budgets that apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelType {
    /// No budget.
    Unlimited,
    /// Limited number of pours.
    Moves {
        /// Pours allowed.
        budget: u32,
    },
    /// Limited play time.
    Timer {
        /// Seconds allowed.
        budget: f64,
    },
    /// Both budgets; whichever runs out first fails the level.
    TimerAndMoves {
        /// Pours allowed.
        move_budget: u32,
        /// Seconds allowed.
        time_budget: f64,
    },
}

impl LevelType {
    /// Classifies a level from its raw budgets. Zero means unlimited.
    ///
    /// # Errors
    ///
    /// Negative, oversized or non-finite budgets are malformed level data.
    #[instrument]
    pub fn detect(max_moves: i64, time_limit_seconds: f64) -> Result<Self, LevelError> {
        if max_moves < 0 {
            return Err(LevelErrorKind::NegativeMoveBudget(max_moves).into());
        }
        let moves = u32::try_from(max_moves)
            .map_err(|_| LevelError::new(LevelErrorKind::MoveBudgetTooLarge(max_moves)))?;
        if !time_limit_seconds.is_finite() {
            return Err(LevelErrorKind::NonFiniteTimeBudget.into());
        }
        if time_limit_seconds < 0.0 {
            return Err(LevelErrorKind::NegativeTimeBudget(time_limit_seconds).into());
        }

        let level_type = match (moves, time_limit_seconds > 0.0) {
            (0, false) => Self::Unlimited,
            (0, true) => Self::Timer {
                budget: time_limit_seconds,
            },
            (budget, false) => Self::Moves { budget },
            (move_budget, true) => Self::TimerAndMoves {
                move_budget,
                time_budget: time_limit_seconds,
            },
        };
        debug!(?level_type, "Detected level type");
        Ok(level_type)
    }

    /// Returns the label for this level type.
    pub fn kind(&self) -> LevelKind {
        match self {
            Self::Unlimited => LevelKind::Normal,
            Self::Moves { .. } => LevelKind::Moves,
            Self::Timer { .. } => LevelKind::Timer,
            Self::TimerAndMoves { .. } => LevelKind::TimerAndMoves,
        }
    }

    /// Move budget, if the level has one.
    pub fn move_budget(&self) -> Option<u32> {
        match *self {
            Self::Moves { budget } => Some(budget),
            Self::TimerAndMoves { move_budget, .. } => Some(move_budget),
            Self::Unlimited | Self::Timer { .. } => None,
        }
    }

    /// Time budget in seconds, if the level has one.
    pub fn time_budget(&self) -> Option<f64> {
        match *self {
            Self::Timer { budget } => Some(budget),
            Self::TimerAndMoves { time_budget, .. } => Some(time_budget),
            Self::Unlimited | Self::Moves { .. } => None,
        }
    }
}

/// A validated, immutable level.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct LevelDefinition {
    /// Initial contents of each tube.
    tubes: Vec<Vec<Color>>,
    /// Declared number of initially empty tubes.
    empty_tube_count: usize,
    /// Budgets, classified.
    level_type: LevelType,
    /// Locked tube indices, sorted and unique.
    locked_tubes: Vec<usize>,
    /// Swap power-ups granted for the level.
    available_swaps: u32,
    /// Opaque modifier tags, carried through untouched.
    twists: Vec<String>,
}

impl LevelDefinition {
    /// Validates a raw record.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelError`] for a level with no tubes, a tube holding more
    /// than [`TUBE_CAPACITY`] segments, a malformed budget, or a locked index
    /// outside the tube list.
    #[instrument(skip(record), fields(tubes = record.tubes.len()))]
    pub fn from_record(record: LevelRecord) -> Result<Self, LevelError> {
        if record.tubes.is_empty() {
            return Err(LevelErrorKind::NoTubes.into());
        }

        if let Some((tube, contents)) = record
            .tubes
            .iter()
            .enumerate()
            .find(|(_, contents)| contents.len() > TUBE_CAPACITY)
        {
            return Err(LevelErrorKind::TubeOverCapacity {
                tube,
                count: contents.len(),
            }
            .into());
        }

        let level_type = LevelType::detect(record.max_moves, record.time_limit_seconds)?;

        let tube_count = record.tubes.len();
        let mut locked_tubes = record.locked_tubes;
        if let Some(&index) = locked_tubes.iter().find(|&&i| i >= tube_count) {
            return Err(LevelErrorKind::LockedIndexOutOfRange { index, tube_count }.into());
        }
        locked_tubes.sort_unstable();
        locked_tubes.dedup();

        let observed_empty = record.tubes.iter().filter(|t| t.is_empty()).count();
        if observed_empty != record.empty_tube_count {
            warn!(
                declared = record.empty_tube_count,
                observed = observed_empty,
                "Declared empty tube count does not match level data"
            );
        }

        Ok(Self {
            tubes: record.tubes,
            empty_tube_count: record.empty_tube_count,
            level_type,
            locked_tubes,
            available_swaps: record.available_swaps,
            twists: record.twists,
        })
    }

    /// Number of tubes in the level.
    pub fn tube_count(&self) -> usize {
        self.tubes.len()
    }

    /// Whether the tube at `index` starts locked.
    pub fn is_locked(&self, index: usize) -> bool {
        self.locked_tubes.binary_search(&index).is_ok()
    }

    /// Builds the live tube set for a fresh attempt.
    ///
    /// # Errors
    ///
    /// Only fails if the definition was constructed around validation.
    #[instrument(skip(self))]
    pub fn build_tubes(&self) -> Result<Vec<Tube>, LevelError> {
        self.tubes
            .iter()
            .enumerate()
            .map(|(index, contents)| {
                Tube::new(contents.clone(), self.is_locked(index)).map_err(|_| {
                    LevelError::new(LevelErrorKind::TubeOverCapacity {
                        tube: index,
                        count: contents.len(),
                    })
                })
            })
            .collect()
    }
}

impl TryFrom<LevelRecord> for LevelDefinition {
    type Error = LevelError;

    fn try_from(record: LevelRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

/// What was wrong with a level or level file.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum LevelErrorKind {
    /// The level defines no tubes.
    #[display("level has no tubes")]
    NoTubes,
    /// A tube starts with more segments than it can hold.
    #[display("tube {} holds {} segments, capacity is {}", tube, count, TUBE_CAPACITY)]
    TubeOverCapacity {
        /// Offending tube.
        tube: usize,
        /// Segments listed for it.
        count: usize,
    },
    /// `max_moves` below zero.
    #[display("max_moves must not be negative, got {}", _0)]
    NegativeMoveBudget(i64),
    /// `max_moves` does not fit a move counter.
    #[display("max_moves {} is too large", _0)]
    MoveBudgetTooLarge(i64),
    /// `time_limit_seconds` below zero.
    #[display("time_limit_seconds must not be negative, got {}", _0)]
    NegativeTimeBudget(f64),
    /// `time_limit_seconds` is NaN or infinite.
    #[display("time_limit_seconds must be finite")]
    NonFiniteTimeBudget,
    /// A locked index points past the tube list.
    #[display("locked tube {} is out of range for {} tubes", index, tube_count)]
    LockedIndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Tubes in the level.
        tube_count: usize,
    },
    /// Requested level does not exist in the catalog.
    #[display("level {} is out of range for {} levels", index, count)]
    LevelIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Levels in the catalog.
        count: usize,
    },
    /// Level file could not be read.
    #[display("failed to read level file: {}", _0)]
    Io(String),
    /// Level file could not be parsed.
    #[display("failed to parse level file: {}", _0)]
    Parse(String),
    /// Level file extension is not recognized.
    #[display("unsupported level file format: {}", _0)]
    UnsupportedFormat(String),
}

/// Malformed level data, with the location that detected it.
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("Level error: {} at {}:{}", kind, file, line)]
pub struct LevelError {
    /// What went wrong.
    pub kind: LevelErrorKind,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl LevelError {
    /// Creates a new level error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: LevelErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<LevelErrorKind> for LevelError {
    #[track_caller]
    fn from(kind: LevelErrorKind) -> Self {
        Self::new(kind)
    }
}
