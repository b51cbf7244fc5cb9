//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// F1 tire-strategy analyzer.
///
/// Reconstructs tire stints from OpenF1 timing data and reports per-stint
/// pace, degradation and pit-stop counts.
#[derive(Debug, Parser)]
#[command(name = "pitwall", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a driver's tire strategy in a session.
    Analyze {
        /// OpenF1 session key.
        #[arg(long)]
        session: u32,

        /// Car number of the driver.
        #[arg(long)]
        driver: u32,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List the drivers entered in a session.
    Drivers {
        /// OpenF1 session key.
        #[arg(long)]
        session: u32,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List the sessions of a championship year.
    Sessions {
        /// Championship year (e.g. 2024).
        #[arg(long)]
        year: u16,

        /// Filter by circuit location substring (case-insensitive).
        #[arg(long)]
        location: Option<String>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}
