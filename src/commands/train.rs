use super::{controls, format_seconds, open_sink, print_persistence, resolve_reference};
use crate::config::Config;
use crate::error::Result;
use crate::session::SessionOutcome;
use crate::timer::{
    CueEmitter, CueSchedule, RunControl, RunObserver, SessionHost, TerminalCues, TracingCues,
    TrainingPhase, TrainingProtocol, TrainingRun,
};
use chrono::Utc;
use colored::Colorize;

/// Prints a header line whenever a training phase begins
struct PhaseBanner {
    total_rounds: u32,
}

impl PhaseBanner {
    fn line(&self, run: &TrainingRun) -> Option<String> {
        let header = format!("Round {}/{}", run.round(), self.total_rounds);
        match run.phase() {
            TrainingPhase::Rest if run.seconds_remaining() == run.rest_seconds() => Some(format!(
                "{}  {} {}",
                header.bold(),
                "Rest".green(),
                format_seconds(run.rest_seconds())
            )),
            TrainingPhase::Hold if run.seconds_remaining() == run.hold_target() => Some(format!(
                "{}  {} {}",
                header.bold(),
                "Hold".red(),
                format_seconds(run.hold_target())
            )),
            _ => None,
        }
    }
}

impl RunObserver for PhaseBanner {
    fn training_progress(&self, run: &TrainingRun) {
        if let Some(line) = self.line(run) {
            println!("{}", line);
        }
    }
}

/// Run a training table for the configured owner
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `reference` - Reference max hold; defaults to the best recorded baseline
/// * `quiet` - Send cues to the log instead of the terminal
pub async fn run_train(config: Config, reference: Option<u32>, quiet: bool) -> Result<()> {
    let protocol = TrainingProtocol::from_config(&config.training)?;
    let sink = open_sink(&config)?;
    let reference = resolve_reference(reference, &sink);

    let run = TrainingRun::new(protocol.clone(), reference, Utc::now());
    let banner = PhaseBanner {
        total_rounds: protocol.total_rounds(),
    };

    println!(
        "{} {} rounds, hold {} each, about {} in total",
        "CO2 table:".bold(),
        banner.total_rounds,
        format_seconds(run.hold_target()),
        format_seconds(protocol.estimated_duration(run.hold_target()).as_secs() as u32)
    );
    println!("Type {} and Enter or press Ctrl-C to stop early.\n", "q".cyan());
    if let Some(line) = banner.line(&run) {
        println!("{}", line);
    }

    let cues: &dyn CueEmitter = if quiet { &TracingCues } else { &TerminalCues };
    let host = SessionHost::new(
        &sink,
        cues,
        CueSchedule::from_config(&config.cues),
        config.tick_interval(),
    )
    .with_observer(&banner);

    let control = RunControl::new();
    let _listener = controls::listen(&control, false);
    let report = host.run_training(run, &control).await;

    if let Some(draft) = &report.draft {
        let rounds = draft.rounds_completed.unwrap_or(0);
        match draft.outcome {
            SessionOutcome::Completed => println!(
                "\n{} {} rounds completed.",
                "Well done!".green().bold(),
                rounds
            ),
            _ => println!(
                "\n{} {} of {} rounds completed.",
                "Stopped early.".yellow().bold(),
                rounds,
                banner.total_rounds
            ),
        }
    }
    print_persistence(&report);

    Ok(())
}
