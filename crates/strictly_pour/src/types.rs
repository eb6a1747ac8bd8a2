//! Core domain types shared by tubes, pours and events.

use serde::{Deserialize, Serialize};

/// Number of segments a tube can hold.
pub const TUBE_CAPACITY: usize = 4;

/// A liquid color, identified by its palette index.
///
/// Colors carry no meaning beyond equality; the presentation layer
/// decides what each index looks like.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("color {}", _0)]
pub struct Color(pub u8);

impl Color {
    /// Returns the palette index of this color.
    pub fn index(self) -> u8 {
        self.0
    }
}

/// A maximal contiguous group of same-colored segments taken from the top of a tube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Run {
    /// Color of every segment in the run.
    pub color: Color,
    /// Number of segments in the run (at least 1).
    pub count: usize,
}

/// A request to pour from one tube into another, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct PourRequest {
    /// Tube to pour from.
    pub source: usize,
    /// Tube to pour into.
    pub dest: usize,
}

/// An accepted pour, as recorded in the session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Pour {
    /// Index of the tube poured from.
    pub source: usize,
    /// Index of the tube poured into.
    pub dest: usize,
    /// Color transferred.
    pub color: Color,
    /// Number of segments transferred.
    pub count: usize,
}

/// A history entry: an accepted pour and the play time at which it happened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct PourRecord {
    /// What moved.
    pub pour: Pour,
    /// Seconds of play elapsed when the pour was committed.
    pub time_used_seconds: f64,
}

impl std::fmt::Display for Pour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({} x{})",
            self.source, self.dest, self.color, self.count
        )
    }
}
