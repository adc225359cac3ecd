//! Drives runs from a tick source and persists their outcome
//!
//! The host owns the [`Ticker`] for the lifetime of a run. It reacts to each
//! tick and to the [`RunControl`] signals, forwards cues, and once the run is
//! terminal it stops the ticker and issues the single persistence request.
//! A failed write is reported in the [`RunReport`], never returned as an
//! error: the run is over either way.

use super::baseline::BaselineRun;
use super::cues::{CueEmitter, CueSchedule};
use super::ticker::Ticker;
use super::training::{TrainingRun, TrainingStep};
use crate::error::Result;
use crate::session::{SessionDraft, SessionRecord};
use async_trait::async_trait;
use metrics::{histogram, increment_counter};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Persistence collaborator
///
/// Implementations decide who owns the record; the draft carries no owner.
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Store a finished run
    async fn create_session(&self, draft: SessionDraft) -> Result<SessionRecord>;
}

/// Supplies the reference max hold a training run is sized from
pub trait ReferenceSource {
    /// Best prior baseline in seconds, if any
    fn reference_max_hold(&self) -> Result<Option<u32>>;
}

/// Observes run progress, e.g. to render a status line
pub trait RunObserver: Send + Sync {
    /// Called after every training tick
    fn training_progress(&self, _run: &TrainingRun) {}

    /// Called after every baseline tick
    fn baseline_progress(&self, _run: &BaselineRun) {}
}

/// Observer that ignores progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Cancellation and stop signals for a run in progress
///
/// Cloning shares the underlying signals. Both signals are idempotent.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    abort: CancellationToken,
    finish: CancellationToken,
}

impl RunControl {
    /// Fresh control with no signal raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to end early
    pub fn abort(&self) {
        self.abort.cancel();
    }

    /// Ask an open-ended hold to stop and be measured
    pub fn finish(&self) {
        self.finish.cancel();
    }

    /// Whether an abort has been requested
    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }

    /// Whether a finish has been requested
    pub fn is_finish_requested(&self) -> bool {
        self.finish.is_cancelled()
    }

    /// Resolves once an abort has been requested
    pub async fn aborted(&self) {
        self.abort.cancelled().await
    }

    /// Resolves once a finish has been requested
    pub async fn finished(&self) {
        self.finish.cancelled().await
    }

    fn ticker_token(&self) -> CancellationToken {
        self.abort.child_token()
    }
}

/// What happened to the terminal write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// The store accepted the record
    Saved(SessionRecord),
    /// The store rejected the record or was unreachable
    Failed(String),
    /// The run ended without anything to record
    Skipped,
}

/// Outcome of a hosted run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The record the run produced, if any
    pub draft: Option<SessionDraft>,
    /// Result of the persistence request
    pub persistence: Persistence,
    /// Ticks consumed by the run
    pub ticks: u64,
}

impl RunReport {
    /// Whether the run produced a record that could not be stored
    pub fn persistence_failed(&self) -> bool {
        matches!(self.persistence, Persistence::Failed(_))
    }
}

/// Runs training and baseline sessions against their collaborators
pub struct SessionHost<'a> {
    sink: &'a dyn SessionSink,
    cues: &'a dyn CueEmitter,
    observer: &'a dyn RunObserver,
    schedule: CueSchedule,
    tick_period: Duration,
}

impl<'a> SessionHost<'a> {
    /// Create a host
    ///
    /// # Arguments
    ///
    /// * `sink` - Receives the single terminal record of each run
    /// * `cues` - Delivers announcements chosen by `schedule`
    /// * `schedule` - Cue thresholds
    /// * `tick_period` - Length of one timer unit
    pub fn new(
        sink: &'a dyn SessionSink,
        cues: &'a dyn CueEmitter,
        schedule: CueSchedule,
        tick_period: Duration,
    ) -> Self {
        Self {
            sink,
            cues,
            observer: &NoopObserver,
            schedule,
            tick_period,
        }
    }

    /// Attach a progress observer
    pub fn with_observer(mut self, observer: &'a dyn RunObserver) -> Self {
        self.observer = observer;
        self
    }

    fn say(&self, cue: Option<String>) {
        if let Some(text) = cue {
            self.cues.announce(&text);
        }
    }

    /// Drive a training run until it finishes or `control` aborts it
    pub async fn run_training(&self, mut run: TrainingRun, control: &RunControl) -> RunReport {
        let mut ticker = Ticker::start(self.tick_period, control.ticker_token());
        tracing::info!(
            hold_target = run.hold_target(),
            initial_rest = run.rest_seconds(),
            "Training run started"
        );
        self.say(self.schedule.training_started());

        let draft = loop {
            tokio::select! {
                biased;
                _ = control.aborted() => {
                    self.say(self.schedule.training_aborted());
                    break run.abort();
                }
                tick = ticker.next() => {
                    if tick.is_none() {
                        break run.abort();
                    }
                    let step = run.tick();
                    self.say(self.schedule.training_step(&step));
                    self.observer.training_progress(&run);
                    if let TrainingStep::Finished(draft) = step {
                        break Some(draft);
                    }
                }
            }
        };

        ticker.stop();
        let ticks = ticker.ticks();
        drop(ticker);

        if let Some(rounds) = draft.as_ref().and_then(|d| d.rounds_completed) {
            histogram!("training_rounds_completed", f64::from(rounds));
        }
        self.conclude(draft, ticks).await
    }

    /// Drive a baseline run until it is stopped or cancelled
    ///
    /// `control.finish()` stops the hold and records it; `control.abort()`
    /// cancels without a record.
    pub async fn run_baseline(&self, mut run: BaselineRun, control: &RunControl) -> RunReport {
        let mut ticker = Ticker::start(self.tick_period, control.ticker_token());
        tracing::info!(prepare = run.prepare_remaining(), "Baseline run started");
        self.say(self.schedule.baseline_started(run.prepare_remaining()));

        let draft = loop {
            tokio::select! {
                biased;
                _ = control.aborted() => {
                    run.cancel();
                    break None;
                }
                _ = control.finished() => {
                    let draft = run.stop();
                    if draft.is_some() {
                        self.say(self.schedule.baseline_stopped());
                    }
                    break draft;
                }
                tick = ticker.next() => {
                    if tick.is_none() {
                        run.cancel();
                        break None;
                    }
                    let step = run.tick();
                    self.say(self.schedule.baseline_step(&step));
                    self.observer.baseline_progress(&run);
                }
            }
        };

        ticker.stop();
        let ticks = ticker.ticks();
        drop(ticker);

        self.conclude(draft, ticks).await
    }

    async fn conclude(&self, draft: Option<SessionDraft>, ticks: u64) -> RunReport {
        let persistence = match &draft {
            Some(draft) => self.persist(draft).await,
            None => Persistence::Skipped,
        };
        RunReport {
            draft,
            persistence,
            ticks,
        }
    }

    async fn persist(&self, draft: &SessionDraft) -> Persistence {
        let kind = draft.kind.as_str();
        match self.sink.create_session(draft.clone()).await {
            Ok(record) => {
                increment_counter!(
                    "sessions_persisted_total",
                    "kind" => kind,
                    "outcome" => draft.outcome.as_str()
                );
                tracing::info!(id = %record.id, kind, outcome = %record.outcome, "Session saved");
                Persistence::Saved(record)
            }
            Err(e) => {
                increment_counter!("session_persist_failures_total", "kind" => kind);
                tracing::warn!(kind, error = %e, "Failed to save session");
                Persistence::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionKind, SessionOutcome};
    use crate::test_utils::{FailingSink, MemorySink, RecordingCues};
    use crate::timer::cues::{HOLD, TRAINING_ABORTED, TRAINING_COMPLETE};
    use crate::timer::protocol::TrainingProtocol;
    use chrono::Utc;

    fn short_protocol() -> TrainingProtocol {
        // rests 4, 2 then done; holds of 3
        TrainingProtocol::new(4, 2, 2, 0.5, 6).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_training_run_completes_and_persists_once() {
        let sink = MemorySink::default();
        let cues = RecordingCues::default();
        let host = SessionHost::new(
            &sink,
            &cues,
            CueSchedule::default(),
            Duration::from_secs(1),
        );
        let run = TrainingRun::new(short_protocol(), None, Utc::now());

        let report = host.run_training(run, &RunControl::new()).await;

        // 4 + 3 + 2 + 3
        assert_eq!(report.ticks, 12);
        let draft = report.draft.clone().unwrap();
        assert_eq!(draft.outcome, SessionOutcome::Completed);
        assert_eq!(draft.rounds_completed, Some(2));
        assert_eq!(draft.target_hold_seconds, Some(3));
        assert!(matches!(report.persistence, Persistence::Saved(_)));
        assert_eq!(sink.drafts(), vec![draft]);

        let said = cues.texts();
        assert_eq!(said.iter().filter(|c| c.as_str() == HOLD).count(), 2);
        assert_eq!(said.last().map(String::as_str), Some(TRAINING_COMPLETE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_before_first_tick_records_zero_rounds() {
        let sink = MemorySink::default();
        let cues = RecordingCues::default();
        let host = SessionHost::new(
            &sink,
            &cues,
            CueSchedule::default(),
            Duration::from_secs(1),
        );
        let control = RunControl::new();
        control.abort();
        control.abort();

        let run = TrainingRun::new(short_protocol(), None, Utc::now());
        let report = host.run_training(run, &control).await;

        assert_eq!(report.ticks, 0);
        let drafts = sink.drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].outcome, SessionOutcome::Incomplete);
        assert_eq!(drafts[0].rounds_completed, Some(0));
        assert!(cues.texts().iter().any(|c| c == TRAINING_ABORTED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_mid_hold_counts_previous_rounds() {
        let sink = MemorySink::default();
        let cues = RecordingCues::default();
        let host = SessionHost::new(
            &sink,
            &cues,
            CueSchedule::disabled(),
            Duration::from_secs(1),
        );
        let control = RunControl::new();
        let aborter = control.clone();
        tokio::spawn(async move {
            // round 1 (4 + 3), round 2 rest (2), 1s into round 2 hold
            tokio::time::sleep(Duration::from_millis(10_500)).await;
            aborter.abort();
        });

        let run = TrainingRun::new(short_protocol(), None, Utc::now());
        let report = host.run_training(run, &control).await;

        assert_eq!(report.ticks, 10);
        let draft = report.draft.unwrap();
        assert_eq!(draft.outcome, SessionOutcome::Incomplete);
        assert_eq!(draft.rounds_completed, Some(1));
        assert!(cues.texts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistence_failure_is_reported_not_raised() {
        let sink = FailingSink;
        let cues = RecordingCues::default();
        let host = SessionHost::new(
            &sink,
            &cues,
            CueSchedule::default(),
            Duration::from_secs(1),
        );
        let run = TrainingRun::new(short_protocol(), None, Utc::now());

        let report = host.run_training(run, &RunControl::new()).await;

        assert!(report.persistence_failed());
        let draft = report.draft.unwrap();
        assert_eq!(draft.outcome, SessionOutcome::Completed);
        assert_eq!(draft.rounds_completed, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_baseline_finish_records_hold() {
        let sink = MemorySink::default();
        let cues = RecordingCues::default();
        let host = SessionHost::new(
            &sink,
            &cues,
            CueSchedule::default(),
            Duration::from_secs(1),
        );
        let control = RunControl::new();
        let stopper = control.clone();
        tokio::spawn(async move {
            // 3s prepare, then 42s of hold
            tokio::time::sleep(Duration::from_millis(45_500)).await;
            stopper.finish();
        });

        let run = BaselineRun::new(3, Utc::now());
        let report = host.run_baseline(run, &control).await;

        let draft = report.draft.unwrap();
        assert_eq!(draft.kind, SessionKind::Baseline);
        assert_eq!(draft.max_hold_seconds, Some(42));
        assert_eq!(sink.drafts().len(), 1);
        assert!(cues.texts().iter().any(|c| c == HOLD));
    }

    #[tokio::test(start_paused = true)]
    async fn test_baseline_abort_skips_persistence() {
        let sink = MemorySink::default();
        let cues = RecordingCues::default();
        let host = SessionHost::new(
            &sink,
            &cues,
            CueSchedule::default(),
            Duration::from_secs(1),
        );
        let control = RunControl::new();
        let canceller = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20_500)).await;
            canceller.abort();
        });

        let run = BaselineRun::new(15, Utc::now());
        let report = host.run_baseline(run, &control).await;

        assert_eq!(report.persistence, Persistence::Skipped);
        assert!(report.draft.is_none());
        assert!(sink.drafts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_baseline_finish_during_prepare_skips_persistence() {
        let sink = MemorySink::default();
        let cues = RecordingCues::default();
        let host = SessionHost::new(
            &sink,
            &cues,
            CueSchedule::default(),
            Duration::from_secs(1),
        );
        let control = RunControl::new();
        control.finish();

        let report = host
            .run_baseline(BaselineRun::new(15, Utc::now()), &control)
            .await;

        assert_eq!(report.persistence, Persistence::Skipped);
        assert!(sink.drafts().is_empty());
    }
}
