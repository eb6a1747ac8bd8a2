//! Command-line interface for strictly_pour.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Pour - Liquid-sort puzzle rules in the terminal
#[derive(Parser, Debug)]
#[command(name = "strictly_pour")]
#[command(about = "Play and check liquid-sort puzzle levels", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a level interactively
    Play {
        /// Level catalog file (.toml or .json)
        #[arg(short, long, default_value = "levels.toml")]
        levels: PathBuf,

        /// Zero-based index of the level to play
        #[arg(long, default_value = "0")]
        level: usize,

        /// Hold each pour until the board has been redrawn
        #[arg(long)]
        await_animation: bool,
    },

    /// Validate every level in a catalog
    Validate {
        /// Level catalog file (.toml or .json)
        #[arg(short, long, default_value = "levels.toml")]
        levels: PathBuf,
    },

    /// List the levels in a catalog
    List {
        /// Level catalog file (.toml or .json)
        #[arg(short, long, default_value = "levels.toml")]
        levels: PathBuf,
    },
}
