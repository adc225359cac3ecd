//! Spoken cues
//!
//! Cues are advisory: the host announces them on a best-effort basis and a
//! dropped cue never changes how a run ends. [`CueSchedule`] decides what to
//! say for each step; a [`CueEmitter`] decides how it is delivered.

use super::baseline::BaselineStep;
use super::training::{TrainingPhase, TrainingStep};
use crate::config::CueConfig;
use colored::Colorize;

/// Delivers cue text to the user
pub trait CueEmitter: Send + Sync {
    /// Announce a cue; failures are the emitter's own business
    fn announce(&self, text: &str);
}

/// Prints cues to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalCues;

impl CueEmitter for TerminalCues {
    fn announce(&self, text: &str) {
        println!("  {} {}", "»".cyan(), text.bold());
    }
}

/// Emits cues as tracing events only
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCues;

impl CueEmitter for TracingCues {
    fn announce(&self, text: &str) {
        tracing::info!(target: "co2trainer::cue", cue = text);
    }
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCues;

impl CueEmitter for SilentCues {
    fn announce(&self, _text: &str) {}
}

pub const TRAINING_START: &str = "Prepare for training. Focus on deep, diaphragmatic breathing.";
pub const REST_WARNING: &str = "seconds remaining. Prepare.";
pub const BREATH_PROMPT: &str = "Take a deep breath.";
pub const HOLD: &str = "Hold.";
pub const RELEASE: &str = "Release. Exhale slowly.";
pub const TRAINING_COMPLETE: &str = "Session complete. Excellent work today.";
pub const TRAINING_ABORTED: &str = "Session ended.";
pub const BASELINE_PREPARE: &str = "Prepare for a deep breath";
pub const BASELINE_STOPPED: &str = "Hold recorded.";

/// Decides which cue, if any, belongs to a step
#[derive(Debug, Clone)]
pub struct CueSchedule {
    enabled: bool,
    rest_warning: u32,
    breath_prompt: u32,
    rest_countdown_from: u32,
    hold_countdown_from: u32,
    prepare_prompt: u32,
}

impl CueSchedule {
    /// Build a schedule from the `cues` configuration section
    pub fn from_config(config: &CueConfig) -> Self {
        Self {
            enabled: config.enabled,
            rest_warning: config.rest_warning_seconds,
            breath_prompt: config.breath_prompt_seconds,
            rest_countdown_from: config.rest_countdown_from,
            hold_countdown_from: config.hold_countdown_from,
            prepare_prompt: config.prepare_prompt_seconds,
        }
    }

    /// A schedule that never produces a cue
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn gate(&self, cue: Option<String>) -> Option<String> {
        cue.filter(|_| self.enabled)
    }

    /// Cue when a training run begins
    pub fn training_started(&self) -> Option<String> {
        self.gate(Some(TRAINING_START.to_string()))
    }

    /// Cue for one training step
    pub fn training_step(&self, step: &TrainingStep) -> Option<String> {
        let cue = match step {
            TrainingStep::Countdown {
                phase: TrainingPhase::Rest,
                remaining,
            } => self.rest_countdown(*remaining),
            TrainingStep::Countdown {
                phase: TrainingPhase::Hold,
                remaining,
            } if *remaining <= self.hold_countdown_from => Some(remaining.to_string()),
            TrainingStep::Countdown { .. } => None,
            TrainingStep::HoldStarted { .. } => Some(HOLD.to_string()),
            TrainingStep::RestStarted { .. } => Some(RELEASE.to_string()),
            TrainingStep::Finished(_) => Some(TRAINING_COMPLETE.to_string()),
            TrainingStep::Idle => None,
        };
        self.gate(cue)
    }

    fn rest_countdown(&self, remaining: u32) -> Option<String> {
        if remaining == self.rest_warning {
            Some(format!("{} {}", remaining, REST_WARNING))
        } else if remaining == self.breath_prompt {
            Some(BREATH_PROMPT.to_string())
        } else if remaining <= self.rest_countdown_from {
            Some(remaining.to_string())
        } else {
            None
        }
    }

    /// Cue when a training run is aborted
    pub fn training_aborted(&self) -> Option<String> {
        self.gate(Some(TRAINING_ABORTED.to_string()))
    }

    /// Cue when a baseline run begins
    pub fn baseline_started(&self, prepare_seconds: u32) -> Option<String> {
        self.gate(Some(format!(
            "Relax your body. Inhale and exhale gently. We will begin in {} seconds.",
            prepare_seconds
        )))
    }

    /// Cue for one baseline step
    pub fn baseline_step(&self, step: &BaselineStep) -> Option<String> {
        let cue = match step {
            BaselineStep::Preparing { remaining } if *remaining == self.prepare_prompt => {
                Some(BASELINE_PREPARE.to_string())
            }
            BaselineStep::Preparing { remaining } if *remaining <= self.rest_countdown_from => {
                Some(remaining.to_string())
            }
            BaselineStep::HoldStarted => Some(HOLD.to_string()),
            BaselineStep::Preparing { .. } | BaselineStep::Holding { .. } | BaselineStep::Idle => {
                None
            }
        };
        self.gate(cue)
    }

    /// Cue when a baseline hold is stopped
    pub fn baseline_stopped(&self) -> Option<String> {
        self.gate(Some(BASELINE_STOPPED.to_string()))
    }
}

impl Default for CueSchedule {
    fn default() -> Self {
        Self::from_config(&CueConfig::default())
    }
}
