//! A single tube: a capacity-bounded stack of color segments.

use crate::types::{Color, Run, TUBE_CAPACITY};
use derive_more::{Display, Error};
use serde::Serialize;
use tracing::instrument;

/// Errors raised by the tube primitives.
///
/// Callers are expected to check [`Tube::can_accept`] and [`Tube::is_empty`]
/// first; these errors only surface when that check was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum TubeError {
    /// Pushing would overflow the tube.
    #[display("cannot push {} segments, only {} free", requested, free)]
    CapacityExceeded {
        /// Segments the caller tried to push.
        requested: usize,
        /// Free slots at the time of the push.
        free: usize,
    },
    /// Popping from a tube with no segments.
    #[display("tube is empty")]
    EmptyTube,
}

/// A tube holding up to [`TUBE_CAPACITY`] segments, bottom to top.
///
/// The filled prefix is the whole of `segments`; there are no holes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Tube {
    segments: Vec<Color>,
    locked: bool,
}

impl Tube {
    /// Creates a tube from its initial contents.
    ///
    /// # Errors
    ///
    /// Returns [`TubeError::CapacityExceeded`] if `segments` is longer than the capacity.
    #[instrument]
    pub fn new(segments: Vec<Color>, locked: bool) -> Result<Self, TubeError> {
        if segments.len() > TUBE_CAPACITY {
            return Err(TubeError::CapacityExceeded {
                requested: segments.len(),
                free: TUBE_CAPACITY,
            });
        }
        Ok(Self { segments, locked })
    }

    /// Creates an empty, unlocked tube.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Segments from bottom to top.
    pub fn segments(&self) -> &[Color] {
        &self.segments
    }

    /// Count of filled segments.
    pub fn top_index(&self) -> usize {
        self.segments.len()
    }

    /// Whether the tube was locked at level start.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True when the tube holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when every slot is filled.
    pub fn is_full(&self) -> bool {
        self.segments.len() == TUBE_CAPACITY
    }

    /// Color of the topmost segment, if any.
    pub fn top_color(&self) -> Option<Color> {
        self.segments.last().copied()
    }

    /// Number of contiguous equal-colored segments ending at the top.
    pub fn top_run_length(&self) -> usize {
        match self.top_color() {
            Some(top) => self
                .segments
                .iter()
                .rev()
                .take_while(|&&c| c == top)
                .count(),
            None => 0,
        }
    }

    /// The top run as a value, if the tube is not empty.
    pub fn top_run(&self) -> Option<Run> {
        self.top_color().map(|color| Run::new(color, self.top_run_length()))
    }

    /// Slots still available.
    pub fn free_capacity(&self) -> usize {
        TUBE_CAPACITY - self.segments.len()
    }

    /// True when the tube is full and holds a single color.
    pub fn is_uniformly_full(&self) -> bool {
        self.is_full() && self.top_run_length() == TUBE_CAPACITY
    }

    /// True when the tube needs no further moves: empty, or full of one color.
    pub fn is_solved(&self) -> bool {
        self.is_empty() || self.is_uniformly_full()
    }

    /// Whether `count` segments of `color` can be poured in.
    ///
    /// An empty tube accepts any color; otherwise the top color must match
    /// and there must be room for the whole run.
    pub fn can_accept(&self, color: Color, count: usize) -> bool {
        if self.is_empty() {
            return count <= TUBE_CAPACITY;
        }
        self.top_color() == Some(color) && self.free_capacity() >= count
    }

    /// Appends `count` segments of `color`.
    ///
    /// # Errors
    ///
    /// Returns [`TubeError::CapacityExceeded`] without modifying the tube if
    /// there is not enough room.
    #[instrument(skip(self), fields(top_index = self.top_index()))]
    pub fn push(&mut self, color: Color, count: usize) -> Result<(), TubeError> {
        let free = self.free_capacity();
        if free < count {
            return Err(TubeError::CapacityExceeded {
                requested: count,
                free,
            });
        }
        self.segments.extend(std::iter::repeat_n(color, count));
        Ok(())
    }

    /// Removes and returns the whole top run.
    ///
    /// # Errors
    ///
    /// Returns [`TubeError::EmptyTube`] if there is nothing to pop.
    #[instrument(skip(self), fields(top_index = self.top_index()))]
    pub fn pop_run(&mut self) -> Result<Run, TubeError> {
        let run = self.top_run().ok_or(TubeError::EmptyTube)?;
        self.segments.truncate(self.segments.len() - run.count);
        Ok(run)
    }
}

impl std::fmt::Display for Tube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for slot in 0..TUBE_CAPACITY {
            match self.segments.get(slot) {
                Some(color) => write!(f, "{:>2}", color.index())?,
                None => write!(f, " .")?,
            }
        }
        write!(f, " ]")?;
        if self.locked {
            write!(f, " locked")?;
        }
        Ok(())
    }
}
