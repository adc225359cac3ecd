//! Session timers
//!
//! The training and baseline state machines are pure: they advance only when
//! ticked and never touch a clock or the store. [`SessionHost`] connects them
//! to a [`Ticker`], to cue delivery and to persistence.

pub mod baseline;
pub mod cues;
pub mod host;
pub mod protocol;
pub mod ticker;
pub mod training;

pub use baseline::{BaselinePhase, BaselineRun, BaselineStep};
pub use cues::{CueEmitter, CueSchedule, SilentCues, TerminalCues, TracingCues};
pub use host::{
    NoopObserver, Persistence, ReferenceSource, RunControl, RunObserver, RunReport, SessionHost,
    SessionSink,
};
pub use protocol::TrainingProtocol;
pub use ticker::Ticker;
pub use training::{TrainingPhase, TrainingRun, TrainingStep};
