//! co2trainer - breath-hold training library
//!
//! This library provides the core of the co2trainer CLI: the training and
//! baseline timers, their cue schedule, session persistence and progress
//! statistics.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `timer`: Training and baseline state machines, the tick source and the
//!   host that drives runs and persists their outcome
//! - `session`: Session records and progress statistics
//! - `storage`: SQLite session store
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use co2trainer::{Config, TrainingProtocol, TrainingRun};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let protocol = TrainingProtocol::from_config(&config.training)?;
//!     let run = TrainingRun::new(protocol, Some(60), chrono::Utc::now());
//!     assert_eq!(run.hold_target(), 30);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;
pub mod timer;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TrainerError};
pub use session::{OwnerId, SessionDraft, SessionKind, SessionOutcome, SessionRecord};
pub use storage::SqliteStorage;
pub use timer::{BaselineRun, RunControl, SessionHost, TrainingProtocol, TrainingRun};

#[cfg(test)]
pub mod test_utils;
