//! Command-line interface definition for co2trainer
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for training, baseline tests, history and statistics.

use crate::session::SessionKind;
use clap::{Parser, Subcommand};

/// co2trainer - breath-hold training from the terminal
///
/// Measure your maximum hold with a baseline test, then build CO2 tolerance
/// with decaying-rest training tables.
#[derive(Parser, Debug, Clone)]
#[command(name = "co2trainer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the session database (overrides config and the default data dir)
    #[arg(long, env = "CO2TRAINER_DB")]
    pub storage_path: Option<String>,

    /// Owner the sessions are recorded for
    #[arg(long)]
    pub owner: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for co2trainer
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a CO2 training table
    Train {
        /// Reference max hold in seconds (defaults to your best baseline)
        #[arg(short, long)]
        reference: Option<u32>,

        /// Do not print spoken cues
        #[arg(long)]
        quiet: bool,
    },

    /// Measure your maximum breath hold
    Baseline {
        /// Do not print spoken cues
        #[arg(long)]
        quiet: bool,
    },

    /// List recorded sessions
    History {
        /// Only show sessions of this kind (baseline, training)
        #[arg(short, long)]
        kind: Option<SessionKind>,

        /// Maximum number of sessions to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show progress statistics
    Stats {
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Preview the training table without running it
    Protocol {
        /// Reference max hold in seconds (defaults to your best baseline)
        #[arg(short, long)]
        reference: Option<u32>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            owner: None,
            command: Commands::Stats { json: false },
        }
    }
}
