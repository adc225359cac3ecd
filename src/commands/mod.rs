/*!
Command handlers for the CLI

Each subcommand lives in its own module:

- `train`:    Run a CO2 training table
- `baseline`: Measure the maximum hold
- `history`:  List recorded sessions
- `stats`:    Progress statistics
- `protocol`: Preview a training table

The handlers are thin: they open the store for the configured owner, build
the timer pieces from configuration and print results.
*/

use crate::config::Config;
use crate::error::Result;
use crate::session::{OwnerId, SessionRecord};
use crate::storage::{OwnedSessionSink, SqliteStorage};
use crate::timer::{Persistence, ReferenceSource, RunReport};
use colored::Colorize;

pub mod baseline;
pub mod controls;
pub mod history;
pub mod protocol;
pub mod stats;
pub mod train;

/// Open the configured store bound to the configured owner
pub(crate) fn open_sink(config: &Config) -> Result<OwnedSessionSink> {
    let storage = SqliteStorage::open(config.storage.db_path.as_deref())?;
    tracing::debug!(db_path = %storage.db_path().display(), "Opened session store");
    Ok(OwnedSessionSink::new(
        storage,
        OwnerId::new(config.profile.owner.trim()),
    ))
}

/// Resolve the reference max hold a table is sized from
///
/// An explicit value wins; otherwise the best recorded baseline is used. A
/// lookup failure is logged and treated as "no reference" so the protocol
/// default applies.
pub(crate) fn resolve_reference(
    explicit: Option<u32>,
    source: &dyn ReferenceSource,
) -> Option<u32> {
    if explicit.is_some() {
        return explicit;
    }
    match source.reference_max_hold() {
        Ok(reference) => reference,
        Err(e) => {
            tracing::warn!(error = %e, "Could not look up best baseline; using default reference");
            None
        }
    }
}

/// Format seconds as `m:ss`
pub(crate) fn format_seconds(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Short form of a record identifier for listings
pub(crate) fn short_id(record: &SessionRecord) -> &str {
    record.id.get(..8).unwrap_or(&record.id)
}

/// Tell the user what became of the run's record
pub(crate) fn print_persistence(report: &RunReport) {
    match &report.persistence {
        Persistence::Saved(record) => {
            println!("{} {}", "Session saved:".green(), short_id(record).cyan());
        }
        Persistence::Failed(message) => {
            eprintln!("{} {}", "Error saving session:".red().bold(), message);
        }
        Persistence::Skipped => {
            println!("{}", "Nothing recorded.".yellow());
        }
    }
}
