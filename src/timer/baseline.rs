//! Baseline test state machine
//!
//! A fixed preparation countdown followed by an open-ended hold that counts
//! up until the user stops it. Only a stopped hold produces a record.

use crate::session::SessionDraft;
use chrono::{DateTime, Utc};

/// Phase of a baseline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselinePhase {
    /// Countdown before the hold
    Prepare,
    /// Breath held; elapsed time counts up
    Hold,
    /// The hold was stopped and measured
    Stopped,
    /// The run was abandoned without a measurement
    Cancelled,
}

impl BaselinePhase {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, BaselinePhase::Stopped | BaselinePhase::Cancelled)
    }
}

/// What a single tick did to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineStep {
    /// The run is terminal; nothing changed
    Idle,
    /// Preparation countdown moved
    Preparing {
        /// Seconds until the hold
        remaining: u32,
    },
    /// Preparation ran out and the hold began
    HoldStarted,
    /// Hold time moved
    Holding {
        /// Seconds held so far
        elapsed: u32,
    },
}

/// State of one baseline run
#[derive(Debug, Clone)]
pub struct BaselineRun {
    phase: BaselinePhase,
    prepare_remaining: u32,
    hold_elapsed: u32,
    started_at: DateTime<Utc>,
}

impl BaselineRun {
    /// Start a run in its preparation countdown
    pub fn new(prepare_seconds: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            phase: BaselinePhase::Prepare,
            prepare_remaining: prepare_seconds,
            hold_elapsed: 0,
            started_at,
        }
    }

    /// Current phase
    pub fn phase(&self) -> BaselinePhase {
        self.phase
    }

    /// Seconds left before the hold
    pub fn prepare_remaining(&self) -> u32 {
        self.prepare_remaining
    }

    /// Seconds held so far
    pub fn hold_elapsed(&self) -> u32 {
        self.hold_elapsed
    }

    /// When the run started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whether the run has been stopped or cancelled
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Advance the run by one unit
    pub fn tick(&mut self) -> BaselineStep {
        match self.phase {
            BaselinePhase::Prepare => {
                self.prepare_remaining = self.prepare_remaining.saturating_sub(1);
                if self.prepare_remaining > 0 {
                    BaselineStep::Preparing {
                        remaining: self.prepare_remaining,
                    }
                } else {
                    self.phase = BaselinePhase::Hold;
                    tracing::debug!("Baseline hold started");
                    BaselineStep::HoldStarted
                }
            }
            BaselinePhase::Hold => {
                self.hold_elapsed = self.hold_elapsed.saturating_add(1);
                BaselineStep::Holding {
                    elapsed: self.hold_elapsed,
                }
            }
            BaselinePhase::Stopped | BaselinePhase::Cancelled => BaselineStep::Idle,
        }
    }

    /// Stop the hold and measure it
    ///
    /// Only meaningful during the hold; a stop during preparation cancels the
    /// run instead, since nothing has been measured yet. Returns the draft to
    /// persist at most once.
    pub fn stop(&mut self) -> Option<SessionDraft> {
        match self.phase {
            BaselinePhase::Hold => {
                self.phase = BaselinePhase::Stopped;
                tracing::info!(max_hold = self.hold_elapsed, "Baseline hold stopped");
                Some(SessionDraft::baseline(self.started_at, self.hold_elapsed))
            }
            BaselinePhase::Prepare => {
                self.cancel();
                None
            }
            BaselinePhase::Stopped | BaselinePhase::Cancelled => None,
        }
    }

    /// Abandon the run without recording anything
    ///
    /// Returns `true` if this call ended the run.
    pub fn cancel(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.phase = BaselinePhase::Cancelled;
        tracing::info!("Baseline run cancelled");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionKind, SessionOutcome};
    use chrono::TimeZone;

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap()
    }

    #[test]
    fn test_prepare_counts_down_then_holds() {
        let mut run = BaselineRun::new(3, started());
        assert_eq!(run.tick(), BaselineStep::Preparing { remaining: 2 });
        assert_eq!(run.tick(), BaselineStep::Preparing { remaining: 1 });
        assert_eq!(run.tick(), BaselineStep::HoldStarted);
        assert_eq!(run.phase(), BaselinePhase::Hold);
        assert_eq!(run.tick(), BaselineStep::Holding { elapsed: 1 });
    }

    #[test]
    fn test_hold_is_uncapped_and_stop_records_elapsed() {
        let mut run = BaselineRun::new(15, started());
        for _ in 0..15 {
            run.tick();
        }
        for _ in 0..312 {
            run.tick();
        }
        let draft = run.stop().expect("stop during hold yields a draft");
        assert_eq!(draft.kind, SessionKind::Baseline);
        assert_eq!(draft.outcome, SessionOutcome::Completed);
        assert_eq!(draft.max_hold_seconds, Some(312));
        assert_eq!(draft.rounds_completed, None);
        assert_eq!(draft.occurred_at, started());
        assert_eq!(run.phase(), BaselinePhase::Stopped);
    }

    #[test]
    fn test_stop_is_single_shot() {
        let mut run = BaselineRun::new(1, started());
        run.tick();
        run.tick();
        assert!(run.stop().is_some());
        assert!(run.stop().is_none());
        assert_eq!(run.tick(), BaselineStep::Idle);
    }

    #[test]
    fn test_stop_during_prepare_cancels() {
        let mut run = BaselineRun::new(15, started());
        run.tick();
        assert!(run.stop().is_none());
        assert_eq!(run.phase(), BaselinePhase::Cancelled);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut run = BaselineRun::new(15, started());
        assert!(run.cancel());
        assert!(!run.cancel());
        assert!(run.stop().is_none());
    }

    #[test]
    fn test_zero_prepare_holds_on_first_tick() {
        let mut run = BaselineRun::new(0, started());
        assert_eq!(run.tick(), BaselineStep::HoldStarted);
    }
}
