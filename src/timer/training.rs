//! Training run state machine
//!
//! A run alternates rest and hold phases. Each [`TrainingRun::tick`] advances
//! the countdown by one unit; when a countdown lands on zero the run moves to
//! the next phase, the next round, or its terminal state. Reaching a terminal
//! state yields the [`SessionDraft`] to persist, exactly once per run.

use super::protocol::TrainingProtocol;
use crate::session::{SessionDraft, SessionOutcome};
use chrono::{DateTime, Utc};

/// Phase of a training run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    /// Recovery breathing between holds
    Rest,
    /// Breath held for the fixed target
    Hold,
    /// The table ran to its end
    Finished,
    /// The run was cancelled before the end
    Aborted,
}

impl TrainingPhase {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainingPhase::Finished | TrainingPhase::Aborted)
    }
}

/// What a single tick did to the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingStep {
    /// The run is already terminal; nothing changed
    Idle,
    /// The countdown moved and the phase is unchanged
    Countdown {
        /// Current phase
        phase: TrainingPhase,
        /// Seconds left in it
        remaining: u32,
    },
    /// A rest ran out and the hold began
    HoldStarted {
        /// Round the hold belongs to
        round: u32,
        /// Length of the hold
        seconds: u32,
    },
    /// A hold ran out and the next round's rest began
    RestStarted {
        /// The new round
        round: u32,
        /// Length of the rest
        seconds: u32,
    },
    /// The last hold ran out; the draft must be persisted
    Finished(SessionDraft),
}

/// State of one training run
#[derive(Debug, Clone)]
pub struct TrainingRun {
    protocol: TrainingProtocol,
    hold_target: u32,
    round: u32,
    rest_seconds: u32,
    phase: TrainingPhase,
    seconds_remaining: u32,
    started_at: DateTime<Utc>,
}

impl TrainingRun {
    /// Start a run in its first rest
    ///
    /// The hold target is derived from `reference_max_hold` here and stays
    /// fixed for the whole run.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use co2trainer::timer::{TrainingPhase, TrainingProtocol, TrainingRun};
    ///
    /// let run = TrainingRun::new(TrainingProtocol::default(), Some(40), Utc::now());
    /// assert_eq!(run.phase(), TrainingPhase::Rest);
    /// assert_eq!(run.round(), 1);
    /// assert_eq!(run.seconds_remaining(), 90);
    /// assert_eq!(run.hold_target(), 20);
    /// ```
    pub fn new(
        protocol: TrainingProtocol,
        reference_max_hold: Option<u32>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let hold_target = protocol.hold_target(reference_max_hold);
        let rest_seconds = protocol.initial_rest();
        Self {
            protocol,
            hold_target,
            round: 1,
            rest_seconds,
            phase: TrainingPhase::Rest,
            seconds_remaining: rest_seconds,
            started_at,
        }
    }

    /// Current phase
    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    /// Current round, starting at 1
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Length of the current round's rest
    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    /// Seconds left in the current phase
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    /// Fixed per-round hold length
    pub fn hold_target(&self) -> u32 {
        self.hold_target
    }

    /// When the run started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Parameters the run follows
    pub fn protocol(&self) -> &TrainingProtocol {
        &self.protocol
    }

    /// Whether the run has finished or been aborted
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Advance the countdown by one unit
    pub fn tick(&mut self) -> TrainingStep {
        if self.is_terminal() {
            return TrainingStep::Idle;
        }

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return TrainingStep::Countdown {
                phase: self.phase,
                remaining: self.seconds_remaining,
            };
        }

        match self.phase {
            TrainingPhase::Rest => {
                self.phase = TrainingPhase::Hold;
                self.seconds_remaining = self.hold_target;
                tracing::debug!(round = self.round, hold = self.hold_target, "Hold started");
                TrainingStep::HoldStarted {
                    round: self.round,
                    seconds: self.hold_target,
                }
            }
            TrainingPhase::Hold => self.complete_round(),
            TrainingPhase::Finished | TrainingPhase::Aborted => TrainingStep::Idle,
        }
    }

    fn complete_round(&mut self) -> TrainingStep {
        match self.protocol.next_rest(self.rest_seconds) {
            Some(next_rest) => {
                self.rest_seconds = next_rest;
                self.round += 1;
                self.phase = TrainingPhase::Rest;
                self.seconds_remaining = next_rest;
                tracing::debug!(round = self.round, rest = next_rest, "Round complete");
                TrainingStep::RestStarted {
                    round: self.round,
                    seconds: next_rest,
                }
            }
            None => {
                self.phase = TrainingPhase::Finished;
                tracing::info!(rounds = self.round, "Training table finished");
                TrainingStep::Finished(SessionDraft::training(
                    self.started_at,
                    self.hold_target,
                    self.round,
                    SessionOutcome::Completed,
                ))
            }
        }
    }

    /// Cancel the run
    ///
    /// Returns the draft to persist the first time it is called on a live
    /// run and `None` afterwards, or when the run already finished. The round
    /// in progress does not count as completed.
    pub fn abort(&mut self) -> Option<SessionDraft> {
        if self.is_terminal() {
            return None;
        }
        self.phase = TrainingPhase::Aborted;
        let rounds_completed = self.round.saturating_sub(1);
        tracing::info!(round = self.round, rounds_completed, "Training run aborted");
        Some(SessionDraft::training(
            self.started_at,
            self.hold_target,
            rounds_completed,
            SessionOutcome::Incomplete,
        ))
    }
}
