use super::{format_seconds, open_sink};
use crate::config::Config;
use crate::error::Result;
use crate::session::ProgressStats;
use colored::Colorize;

fn hold_or_dash(seconds: Option<u32>) -> String {
    seconds
        .map(format_seconds)
        .unwrap_or_else(|| "-".to_string())
}

/// Render statistics as the lines of the summary view
pub fn summary_lines(stats: &ProgressStats) -> Vec<String> {
    let mut lines = vec![
        format!("{:<16}{}", "Sessions", stats.total_sessions),
        format!("{:<16}{}", "Today", stats.sessions_today),
        format!("{:<16}{}", "Best hold", hold_or_dash(stats.best_hold)),
        format!("{:<16}{}", "Latest hold", hold_or_dash(stats.latest_hold)),
        format!("{:<16}{}", "Active days", stats.active_days),
        format!(
            "{:<16}{} day{}",
            "Streak",
            stats.current_streak,
            if stats.current_streak == 1 { "" } else { "s" }
        ),
    ];

    if !stats.baseline_trend.is_empty() {
        lines.push(String::new());
        lines.push("Baseline trend".to_string());
        let peak = stats
            .baseline_trend
            .iter()
            .map(|p| p.seconds)
            .max()
            .unwrap_or(1)
            .max(1);
        for point in &stats.baseline_trend {
            let width = (point.seconds as usize * 30) / peak as usize;
            lines.push(format!(
                "  {}  {:>5}  {}",
                point.date.format("%m-%d"),
                format_seconds(point.seconds),
                "█".repeat(width.max(1))
            ));
        }
    }

    lines
}

/// Show progress statistics for the configured owner
pub fn handle_stats(config: &Config, json: bool) -> Result<()> {
    let sink = open_sink(config)?;
    let stats = ProgressStats::compute(&sink.list_sessions()?, &chrono::Local::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("\n{} {}\n", "Progress for".bold(), sink.owner().to_string().cyan());
    for line in summary_lines(&stats) {
        println!("{}", line);
    }
    println!();

    Ok(())
}
