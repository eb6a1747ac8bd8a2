//! Session controller: the state machine that turns tube clicks into pours.
//!
//! The controller is the only component with mutable cross-cutting state.
//! It owns the [`Session`], routes selection input to the [`PourEngine`],
//! feeds results to the [`SessionRuleEvaluator`], and buffers outward
//! [`SessionEvent`]s for presentation and storage collaborators.

use crate::engine::{PourEngine, PourRejection, PourResult};
use crate::evaluator::{Evaluation, SessionRuleEvaluator};
use crate::events::SessionEvent;
use crate::invariants::{InvariantSet, SessionInvariants};
use crate::level::{LevelDefinition, LevelError, LevelErrorKind};
use crate::session::{Outcome, Session, SessionOptions};
use crate::types::{Pour, PourRecord};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  States and results
// ─────────────────────────────────────────────────────────────

/// Lifecycle of a controller.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
pub enum SessionState {
    /// No level loaded yet.
    #[default]
    Loading,
    /// Accepting input.
    Playing,
    /// Puzzle solved. Terminal.
    Won,
    /// A budget ran out. Terminal.
    Failed,
}

impl SessionState {
    /// True for `Won` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Failed)
    }
}

/// What a tube click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// First click of a gesture; the tube is now selected.
    Selected(usize),
    /// The selected tube was clicked again and released.
    Deselected(usize),
    /// An empty tube was clicked with nothing selected.
    EmptyRejected(usize),
    /// Second click of a gesture; a pour was attempted.
    Poured(PourResult),
    /// The level is over; input is ignored.
    Ignored,
}

// ─────────────────────────────────────────────────────────────
//  Errors
// ─────────────────────────────────────────────────────────────

/// Programmer errors surfaced by the controller.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum SessionErrorKind {
    /// Input arrived before any level was loaded.
    #[display("no level is loaded")]
    NotStarted,
    /// A tube index outside the tube array.
    #[display("tube {} is out of range for {} tubes", index, tube_count)]
    TubeIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Tubes in the session.
        tube_count: usize,
    },
    /// Elapsed time reported by the clock was negative or not finite.
    #[display("elapsed time must be finite and non-negative, got {}", _0)]
    InvalidElapsed(f64),
    /// The level could not be loaded.
    #[display("{}", _0)]
    Level(LevelErrorKind),
    /// A recorded pour was refused during replay.
    #[display("replayed pour {} was rejected: {}", step, reason)]
    ReplayRejected {
        /// Position of the pour in the record.
        step: usize,
        /// Why it was refused.
        reason: PourRejection,
    },
    /// A replayed timestamp is earlier than the time already played.
    #[display(
        "replay step {} is recorded at {}s but {}s were already played",
        step,
        recorded,
        played
    )]
    ReplayClockReversed {
        /// Position in the record; the pour count for the final time.
        step: usize,
        /// Play time the record claims.
        recorded: f64,
        /// Play time the session had reached.
        played: f64,
    },
    /// A recorded pour moved something other than what was recorded.
    #[display("replayed pour {} moved {}, record says {}", step, actual, recorded)]
    ReplayMismatch {
        /// Position of the pour in the record.
        step: usize,
        /// What the record claims.
        recorded: Pour,
        /// What the engine did.
        actual: Pour,
    },
}

/// Hard failure from the controller, with the location that raised it.
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("Session error: {} at {}:{}", kind, file, line)]
pub struct SessionError {
    /// What went wrong.
    pub kind: SessionErrorKind,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a new session error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: SessionErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<SessionErrorKind> for SessionError {
    #[track_caller]
    fn from(kind: SessionErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<LevelError> for SessionError {
    #[track_caller]
    fn from(err: LevelError) -> Self {
        Self::new(SessionErrorKind::Level(err.kind))
    }
}

// ─────────────────────────────────────────────────────────────
//  Controller
// ─────────────────────────────────────────────────────────────

/// Drives one level attempt at a time.
///
/// Call [`SessionController::start`] with a validated level, then feed it
/// [`select_tube`](Self::select_tube), [`tick`](Self::tick) and
/// [`animation_complete`](Self::animation_complete). Collect outward events
/// with [`drain_events`](Self::drain_events).
#[derive(Debug, Clone, Default)]
pub struct SessionController {
    options: SessionOptions,
    state: SessionState,
    level: Option<LevelDefinition>,
    session: Option<Session>,
    events: Vec<SessionEvent>,
}

impl SessionController {
    /// Creates a controller in the `Loading` state.
    #[instrument]
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Loads `level` and begins playing it.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelError`] if the tubes cannot be built; the controller
    /// then stays in `Loading` and keeps no session.
    #[instrument(skip(self, level), fields(tubes = level.tube_count()))]
    pub fn start(&mut self, level: LevelDefinition) -> Result<(), LevelError> {
        self.state = SessionState::Loading;
        self.session = None;

        let session = Session::new(&level)?;
        info!(kind = %level.level_type().kind(), "Level started");

        self.events.push(SessionEvent::LevelStarted {
            tube_count: session.tubes().len(),
            kind: level.level_type().kind(),
        });
        self.events.push(SessionEvent::MovesRemainingChanged {
            remaining: session.remaining_moves(),
        });
        self.events.push(SessionEvent::TimeRemainingChanged {
            remaining: session.remaining_time(),
        });

        self.session = Some(session);
        self.level = Some(level);
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Replaces the current attempt with a fresh one at `level`.
    ///
    /// # Errors
    ///
    /// See [`SessionController::start`].
    #[instrument(skip(self, level))]
    pub fn restart(&mut self, level: LevelDefinition) -> Result<(), LevelError> {
        info!(previous = %self.state, "Restarting level");
        self.start(level)
    }

    /// Restarts the level currently loaded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionErrorKind::NotStarted`] if no level was ever loaded.
    #[instrument(skip(self))]
    pub fn retry(&mut self) -> Result<(), SessionError> {
        let level = self
            .level
            .clone()
            .ok_or_else(|| SessionError::new(SessionErrorKind::NotStarted))?;
        self.restart(level)?;
        Ok(())
    }

    /// Handles a click on tube `index`.
    ///
    /// Rejected pours are normal results, not errors; the selection is kept
    /// so the player can pick another destination.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if no level is loaded or `index` is not a tube.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn select_tube(&mut self, index: usize) -> Result<SelectOutcome, SessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| SessionError::new(SessionErrorKind::NotStarted))?;

        let tube_count = session.tubes().len();
        if index >= tube_count {
            warn!(index, tube_count, "Tube index out of range");
            return Err(SessionErrorKind::TubeIndexOutOfRange { index, tube_count }.into());
        }

        if session.is_over() {
            debug!("Ignoring input after outcome");
            return Ok(SelectOutcome::Ignored);
        }

        let outcome = match session.selected {
            None if session.tubes()[index].is_empty() => {
                self.events.push(SessionEvent::SelectionRejected { index });
                SelectOutcome::EmptyRejected(index)
            }
            None => {
                session.selected = Some(index);
                self.events.push(SessionEvent::TubeSelected { index });
                SelectOutcome::Selected(index)
            }
            Some(selected) if selected == index => {
                session.selected = None;
                self.events.push(SessionEvent::TubeDeselected { index });
                SelectOutcome::Deselected(index)
            }
            Some(source) => {
                let result = PourEngine::try_pour(session, source, index);
                match result {
                    PourResult::Accepted(pour) => {
                        session.selected = None;
                        session.pour_in_flight = self.options.await_animation;
                        self.events.push(SessionEvent::PourAccepted {
                            source_index: pour.source,
                            dest_index: pour.dest,
                            color: pour.color,
                            count: pour.count,
                        });
                        let evaluation = SessionRuleEvaluator::on_pour_accepted(session);
                        debug_assert!(
                            SessionInvariants::check_all(session).is_ok(),
                            "session invariants violated"
                        );
                        Self::apply(session, &mut self.state, &mut self.events, evaluation);
                    }
                    PourResult::Rejected(reason) => {
                        self.events.push(SessionEvent::PourRejected {
                            source_index: source,
                            dest_index: index,
                            reason,
                        });
                    }
                }
                SelectOutcome::Poured(result)
            }
        };
        Ok(outcome)
    }

    /// Reports elapsed play time from the external clock.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if no level is loaded or `elapsed_seconds`
    /// is negative or not finite.
    #[instrument(skip(self))]
    pub fn tick(&mut self, elapsed_seconds: f64) -> Result<(), SessionError> {
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            warn!(elapsed_seconds, "Clock reported invalid elapsed time");
            return Err(SessionErrorKind::InvalidElapsed(elapsed_seconds).into());
        }
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| SessionError::new(SessionErrorKind::NotStarted))?;

        let evaluation = SessionRuleEvaluator::on_elapsed(session, elapsed_seconds);
        Self::apply(session, &mut self.state, &mut self.events, evaluation);
        Ok(())
    }

    /// Signals that the presentation finished showing the last pour.
    ///
    /// Releases the pour lock so the next pour can be accepted.
    #[instrument(skip(self))]
    pub fn animation_complete(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.pour_in_flight {
                debug!("Pour lock released");
            }
            session.pour_in_flight = false;
        }
    }

    /// Takes all buffered events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffered events not yet drained.
    pub fn pending_events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The live session, once a level is loaded.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The level being played.
    pub fn level(&self) -> Option<&LevelDefinition> {
        self.level.as_ref()
    }

    /// Options the controller was created with.
    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Terminal result, once reached.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.session.as_ref().and_then(Session::outcome)
    }

    /// Rebuilds a finished or in-progress attempt from recorded pours.
    ///
    /// Before each pour the clock is advanced to the pour's recorded play
    /// time, and after the last one to `time_used_seconds`, so time budgets
    /// and star ratings come out as they did live. Every pour goes through
    /// the same engine and rules as live play, so a storage collaborator can
    /// verify a reported result.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the level is malformed, a recorded pour
    /// is rejected or moves something other than what was recorded, or the
    /// recorded times run backwards.
    #[instrument(skip(level, records), fields(pours = records.len()))]
    pub fn replay(
        level: LevelDefinition,
        records: &[PourRecord],
        time_used_seconds: f64,
    ) -> Result<Self, SessionError> {
        let mut controller = Self::new(SessionOptions::default());
        controller.start(level)?;

        for (step, record) in records.iter().enumerate() {
            controller.advance_clock_to(step, record.time_used_seconds)?;
            let recorded = record.pour;

            controller.select_tube(recorded.source)?;
            match controller.select_tube(recorded.dest)? {
                SelectOutcome::Poured(PourResult::Accepted(actual)) => {
                    if actual != recorded {
                        return Err(SessionErrorKind::ReplayMismatch {
                            step,
                            recorded,
                            actual,
                        }
                        .into());
                    }
                }
                SelectOutcome::Poured(PourResult::Rejected(reason)) => {
                    return Err(SessionErrorKind::ReplayRejected { step, reason }.into());
                }
                SelectOutcome::Ignored => {
                    return Err(SessionErrorKind::ReplayRejected {
                        step,
                        reason: PourRejection::SessionOver,
                    }
                    .into());
                }
                SelectOutcome::Selected(_)
                | SelectOutcome::Deselected(_)
                | SelectOutcome::EmptyRejected(_) => {
                    let reason = if recorded.source == recorded.dest {
                        PourRejection::Invalid
                    } else {
                        PourRejection::SourceEmpty
                    };
                    return Err(SessionErrorKind::ReplayRejected { step, reason }.into());
                }
            }
        }
        controller.advance_clock_to(records.len(), time_used_seconds)?;

        info!(state = %controller.state, "Replay complete");
        Ok(controller)
    }

    /// Ticks the clock forward until `time_used_seconds` of play have elapsed.
    fn advance_clock_to(
        &mut self,
        step: usize,
        time_used_seconds: f64,
    ) -> Result<(), SessionError> {
        let played = self.session.as_ref().map_or(0.0, Session::time_used);
        let elapsed = time_used_seconds - played;
        if elapsed.is_nan() || elapsed < 0.0 {
            warn!(step, time_used_seconds, played, "Replay clock runs backwards");
            return Err(SessionErrorKind::ReplayClockReversed {
                step,
                recorded: time_used_seconds,
                played,
            }
            .into());
        }
        self.tick(elapsed)
    }

    /// Emits events for an evaluation and moves to a terminal state if needed.
    fn apply(
        session: &mut Session,
        state: &mut SessionState,
        events: &mut Vec<SessionEvent>,
        evaluation: Evaluation,
    ) {
        if let Some(remaining) = evaluation.moves_remaining {
            events.push(SessionEvent::MovesRemainingChanged { remaining });
        }
        if let Some(remaining) = evaluation.time_remaining {
            events.push(SessionEvent::TimeRemainingChanged { remaining });
        }
        match evaluation.outcome {
            Some(Outcome::Won {
                stars,
                time_used,
                moves_used,
            }) => {
                session.selected = None;
                *state = SessionState::Won;
                events.push(SessionEvent::LevelWon {
                    stars,
                    time_used_seconds: time_used,
                    moves_used,
                });
            }
            Some(Outcome::Failed { reason }) => {
                session.selected = None;
                *state = SessionState::Failed;
                events.push(SessionEvent::LevelFailed { reason });
            }
            None => {}
        }
    }
}
