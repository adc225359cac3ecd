use super::{controls, format_seconds, open_sink, print_persistence};
use crate::config::Config;
use crate::error::Result;
use crate::timer::{
    BaselinePhase, BaselineRun, CueEmitter, CueSchedule, RunControl, RunObserver, SessionHost,
    TerminalCues, TracingCues,
};
use chrono::Utc;
use colored::Colorize;

/// Elapsed hold time is echoed at this interval
const ELAPSED_EVERY: u32 = 30;

/// Prints hold start and periodic elapsed time
struct HoldClock;

impl HoldClock {
    fn line(run: &BaselineRun) -> Option<String> {
        if run.phase() != BaselinePhase::Hold {
            return None;
        }
        match run.hold_elapsed() {
            0 => Some(format!(
                "{} Press Enter when you take your next breath.",
                "Holding.".red().bold()
            )),
            elapsed if elapsed % ELAPSED_EVERY == 0 => Some(format!("  {}", format_seconds(elapsed))),
            _ => None,
        }
    }
}

impl RunObserver for HoldClock {
    fn baseline_progress(&self, run: &BaselineRun) {
        if let Some(line) = Self::line(run) {
            println!("{}", line);
        }
    }
}

/// Run a baseline test for the configured owner
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `quiet` - Send cues to the log instead of the terminal
pub async fn run_baseline(config: Config, quiet: bool) -> Result<()> {
    let sink = open_sink(&config)?;
    let run = BaselineRun::new(config.baseline.prepare_seconds, Utc::now());

    println!(
        "{} breathe calmly for {}, then hold as long as you comfortably can.",
        "Baseline test:".bold(),
        format_seconds(run.prepare_remaining())
    );
    println!(
        "Press Enter to stop the hold. Type {} and Enter or press Ctrl-C to cancel.\n",
        "q".cyan()
    );

    let cues: &dyn CueEmitter = if quiet { &TracingCues } else { &TerminalCues };
    let host = SessionHost::new(
        &sink,
        cues,
        CueSchedule::from_config(&config.cues),
        config.tick_interval(),
    )
    .with_observer(&HoldClock);

    let control = RunControl::new();
    let _listener = controls::listen(&control, true);
    let report = host.run_baseline(run, &control).await;

    match report.draft.as_ref().and_then(|d| d.max_hold_seconds) {
        Some(seconds) => println!(
            "\n{} {}",
            "Maximum hold:".green().bold(),
            format_seconds(seconds)
        ),
        None => println!("\n{}", "Baseline cancelled.".yellow()),
    }
    print_persistence(&report);

    Ok(())
}
