//! Strictly Pour - Terminal front end
//!
//! Plays, validates and lists liquid-sort puzzle levels.

#![warn(missing_docs)]

mod cli;
mod input;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use input::{HELP, Input};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use strictly_pour::{
    LevelCatalog, SelectOutcome, SessionController, SessionErrorKind, SessionOptions,
};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,strictly_pour=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            levels,
            level,
            await_animation,
        } => run_play(levels, level, await_animation),
        Command::Validate { levels } => run_validate(&levels),
        Command::List { levels } => run_list(&levels),
    }
}

/// Play one level interactively on stdin/stdout.
#[instrument]
fn run_play(levels: PathBuf, level: usize, await_animation: bool) -> Result<()> {
    let catalog = LevelCatalog::from_file(&levels)?;
    let definition = catalog.level(level)?;

    let mut controller = SessionController::new(SessionOptions { await_animation });
    controller.start(definition)?;
    info!(level, "Playing");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", HELP)?;
    flush_events(&mut controller, &mut stdout)?;
    show_board(&controller, &mut stdout)?;

    let mut clock = Instant::now();
    for line in stdin.lock().lines() {
        let line = line?;

        let now = Instant::now();
        controller.tick(now.duration_since(clock).as_secs_f64())?;
        clock = now;

        match Input::parse(&line) {
            Some(Input::Quit) => break,
            Some(Input::Help) => writeln!(stdout, "{}", HELP)?,
            Some(Input::Retry) => controller.retry()?,
            Some(Input::Tube(index)) => match controller.select_tube(index) {
                Ok(SelectOutcome::Ignored) => {
                    writeln!(stdout, "The level is over. Type r to retry or q to quit.")?
                }
                Ok(outcome) => debug!(?outcome, "Selection handled"),
                Err(e) => match e.kind {
                    SessionErrorKind::TubeIndexOutOfRange { tube_count, .. } => {
                        writeln!(stdout, "Pick a tube from 0 to {}.", tube_count - 1)?
                    }
                    _ => return Err(e.into()),
                },
            },
            None => writeln!(stdout, "Unrecognized input: {:?} (h for help)", line.trim())?,
        }

        flush_events(&mut controller, &mut stdout)?;
        // The board redraw is this front end's whole pour animation.
        controller.animation_complete();
        show_board(&controller, &mut stdout)?;
    }

    if let Some(outcome) = controller.outcome() {
        writeln!(stdout, "{}", outcome)?;
    }
    Ok(())
}

/// Print buffered controller events.
fn flush_events(controller: &mut SessionController, out: &mut impl Write) -> Result<()> {
    for event in controller.drain_events() {
        writeln!(out, "  {}", event)?;
    }
    Ok(())
}

/// Print the tubes and counters.
fn show_board(controller: &SessionController, out: &mut impl Write) -> Result<()> {
    if let Some(session) = controller.session() {
        writeln!(out, "{}", session)?;
    }
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Validate every level in a catalog, failing if any is malformed.
#[instrument]
fn run_validate(levels: &Path) -> Result<()> {
    let catalog = LevelCatalog::from_file(levels)?;
    let reports = catalog.validate_all();

    let mut invalid = 0;
    for report in &reports {
        match report.outcome() {
            Ok(kind) => println!("level {}: ok ({})", report.index(), kind),
            Err(e) => {
                invalid += 1;
                println!("level {}: {}", report.index(), e.kind);
            }
        }
    }

    if invalid > 0 {
        warn!(invalid, total = reports.len(), "Catalog has invalid levels");
        bail!("{} of {} levels are invalid", invalid, reports.len());
    }
    info!(total = reports.len(), "All levels valid");
    Ok(())
}

/// List the levels in a catalog.
#[instrument]
fn run_list(levels: &Path) -> Result<()> {
    let catalog = LevelCatalog::from_file(levels)?;
    let reports = catalog.validate_all();

    println!("{} levels in {}", catalog.len(), levels.display());
    for (record, report) in catalog.records().iter().zip(&reports) {
        println!("{}", input::summary_line(record, report));
    }
    Ok(())
}
