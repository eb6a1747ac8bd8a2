//! Player input parsing and catalog summaries for the terminal front end.

use strictly_pour::{LevelRecord, LevelReport};

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Click on the tube at this zero-based index.
    Tube(usize),
    /// Start the level over.
    Retry,
    /// Show the command help.
    Help,
    /// Leave the game.
    Quit,
}

impl Input {
    /// Parses a line; `None` for anything unrecognized.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim().to_ascii_lowercase();
        match line.as_str() {
            "q" | "quit" | "exit" => Some(Self::Quit),
            "r" | "retry" | "restart" => Some(Self::Retry),
            "h" | "help" | "?" => Some(Self::Help),
            other => other.parse().ok().map(Self::Tube),
        }
    }
}

/// Help text shown at start and on request.
pub const HELP: &str = "\
Type a tube number to select it, then another to pour into it.
Type the selected tube again to cancel.
  r  retry the level
  h  show this help
  q  quit";

/// One line describing a catalog entry for `list`.
pub fn summary_line(record: &LevelRecord, report: &LevelReport) -> String {
    match report.outcome() {
        Ok(kind) => format!(
            "{:>3}  {:<14} tubes={:<2} moves={:<4} time={}s locked={}",
            report.index(),
            kind.to_string(),
            report.tube_count(),
            record.max_moves,
            record.time_limit_seconds,
            record.locked_tubes.len()
        ),
        Err(e) => format!("{:>3}  invalid: {}", report.index(), e.kind),
    }
}
