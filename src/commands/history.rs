use super::{format_seconds, open_sink, short_id};
use crate::config::Config;
use crate::error::Result;
use crate::session::{SessionKind, SessionOutcome, SessionRecord};
use crate::timer::ReferenceSource;
use colored::{ColoredString, Colorize};
use prettytable::{format, Table};

/// Keep the sessions matching `kind`, newest first, up to `limit`
pub fn select_sessions(
    sessions: Vec<SessionRecord>,
    kind: Option<SessionKind>,
    limit: Option<usize>,
) -> Vec<SessionRecord> {
    sessions
        .into_iter()
        .filter(|s| kind.map_or(true, |k| s.kind == k))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

fn outcome_cell(outcome: SessionOutcome) -> ColoredString {
    match outcome {
        SessionOutcome::Completed => outcome.as_str().green(),
        SessionOutcome::Incomplete => outcome.as_str().yellow(),
        SessionOutcome::Cancelled => outcome.as_str().red(),
    }
}

/// Build the history table
pub fn history_table(sessions: &[SessionRecord]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Date".bold(),
        "Kind".bold(),
        "Hold".bold(),
        "Rounds".bold(),
        "Outcome".bold()
    ]);

    for session in sessions {
        let date = session
            .occurred_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        let hold = session
            .headline_seconds()
            .map(format_seconds)
            .unwrap_or_else(|| "-".to_string());
        let rounds = session
            .rounds_completed
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(prettytable::row![
            short_id(session).cyan(),
            date,
            session.kind,
            hold,
            rounds,
            outcome_cell(session.outcome)
        ]);
    }

    table
}

/// List the configured owner's sessions
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `kind` - Only show this kind of session
/// * `limit` - Maximum number of sessions
/// * `json` - Print JSON instead of a table
pub fn handle_history(
    config: &Config,
    kind: Option<SessionKind>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let sink = open_sink(config)?;
    let sessions = select_sessions(sink.list_sessions()?, kind, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("{}", "No sessions recorded yet.".yellow());
        return Ok(());
    }

    println!("\nSession History ({}):", sink.owner());
    history_table(&sessions).printstd();
    println!();
    if let Some(best) = sink.reference_max_hold()? {
        println!("Best baseline: {}", format_seconds(best).green().bold());
        println!();
    }

    Ok(())
}
