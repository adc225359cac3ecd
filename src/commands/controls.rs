//! Keyboard and signal wiring for interactive runs
//!
//! Ctrl-C and a `q` line on stdin abort the run. For baseline runs a bare
//! Enter finishes the hold.

use crate::timer::RunControl;
use std::io::BufRead;
use tokio::task::JoinHandle;

/// What a line typed on stdin means for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    /// End the run early
    Abort,
    /// Stop an open-ended hold
    Finish,
    /// Not a command
    Ignore,
}

/// Interpret one stdin line
pub fn classify_line(line: &str, enter_finishes: bool) -> LineAction {
    match line.trim() {
        "q" | "Q" | "quit" => LineAction::Abort,
        "" if enter_finishes => LineAction::Finish,
        _ => LineAction::Ignore,
    }
}

/// Listeners feeding a [`RunControl`]; the signal handler is removed on drop
pub struct ControlListener {
    signal_task: JoinHandle<()>,
}

impl Drop for ControlListener {
    fn drop(&mut self) {
        self.signal_task.abort();
    }
}

/// Start listening for Ctrl-C and stdin commands
///
/// Stdin is read on a detached std thread, outside the runtime.
pub fn listen(control: &RunControl, enter_finishes: bool) -> ControlListener {
    let on_signal = control.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Interrupt received");
            on_signal.abort();
        }
    });

    let on_line = control.clone();
    let spawned = std::thread::Builder::new()
        .name("co2trainer-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match classify_line(&line, enter_finishes) {
                    LineAction::Abort => {
                        on_line.abort();
                        break;
                    }
                    LineAction::Finish => {
                        on_line.finish();
                        break;
                    }
                    LineAction::Ignore => {}
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "Could not read stdin; only Ctrl-C will stop the run");
    }

    ControlListener { signal_task }
}
