use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of the principal a session belongs to
///
/// The store stamps this onto every record it creates; it is never read from
/// the draft a run produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which protocol produced a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// A single open-ended hold measuring maximum capacity
    Baseline,
    /// A multi-round CO2 table
    Training,
}

impl SessionKind {
    /// Stable storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Baseline => "baseline",
            SessionKind::Training => "training",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(SessionKind::Baseline),
            "training" => Ok(SessionKind::Training),
            other => Err(format!("unknown session kind '{}'", other)),
        }
    }
}

/// Terminal disposition of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The protocol ran to its natural end (or the hold was stopped)
    Completed,
    /// The run was aborted part-way through
    Incomplete,
    /// The run was abandoned before producing a measurement
    Cancelled,
}

impl SessionOutcome {
    /// Stable storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::Incomplete => "incomplete",
            SessionOutcome::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionOutcome {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "completed" => Ok(SessionOutcome::Completed),
            "incomplete" => Ok(SessionOutcome::Incomplete),
            "cancelled" => Ok(SessionOutcome::Cancelled),
            other => Err(format!("unknown session outcome '{}'", other)),
        }
    }
}

/// A session as produced by a run, before the store has accepted it
///
/// Carries no owner: ownership comes from the principal the
/// store is called with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    /// Which protocol produced the session
    pub kind: SessionKind,
    /// When the run started
    pub occurred_at: DateTime<Utc>,
    /// Longest hold in seconds (baseline only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hold_seconds: Option<u32>,
    /// Per-round hold target in seconds (training only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_hold_seconds: Option<u32>,
    /// Rounds finished before the run ended (training only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds_completed: Option<u32>,
    /// Terminal disposition
    pub outcome: SessionOutcome,
}

impl SessionDraft {
    /// Draft for a finished baseline hold
    pub fn baseline(occurred_at: DateTime<Utc>, max_hold_seconds: u32) -> Self {
        Self {
            kind: SessionKind::Baseline,
            occurred_at,
            max_hold_seconds: Some(max_hold_seconds),
            target_hold_seconds: None,
            rounds_completed: None,
            outcome: SessionOutcome::Completed,
        }
    }

    /// Draft for a training run that ended with the given outcome
    pub fn training(
        occurred_at: DateTime<Utc>,
        target_hold_seconds: u32,
        rounds_completed: u32,
        outcome: SessionOutcome,
    ) -> Self {
        Self {
            kind: SessionKind::Training,
            occurred_at,
            max_hold_seconds: None,
            target_hold_seconds: Some(target_hold_seconds),
            rounds_completed: Some(rounds_completed),
            outcome,
        }
    }
}

/// A stored session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Store-assigned identifier (UUID v4)
    pub id: String,
    /// Principal who ran the session
    pub owner: OwnerId,
    /// Which protocol produced the session
    pub kind: SessionKind,
    /// When the run started
    pub occurred_at: DateTime<Utc>,
    /// Longest hold in seconds (baseline only)
    pub max_hold_seconds: Option<u32>,
    /// Per-round hold target in seconds (training only)
    pub target_hold_seconds: Option<u32>,
    /// Rounds finished before the run ended (training only)
    pub rounds_completed: Option<u32>,
    /// Terminal disposition
    pub outcome: SessionOutcome,
    /// When the store accepted the record
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Seconds shown in history listings: the measured hold for baselines,
    /// the target hold for training runs
    pub fn headline_seconds(&self) -> Option<u32> {
        self.max_hold_seconds.or(self.target_hold_seconds)
    }
}
