//! Test utilities for co2trainer
//!
//! Temporary files and configuration, plus in-memory collaborators
//! for driving a [`crate::timer::SessionHost`] without a database.

use crate::config::Config;
use crate::error::{Result, TrainerError};
use crate::session::{OwnerId, SessionDraft, SessionRecord};
use crate::timer::{CueEmitter, SessionSink};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// A short table with fast ticks for end-to-end runs
pub fn test_config_yaml() -> String {
    r#"
training:
  initial_rest_seconds: 4
  rest_decrement_seconds: 2
  minimum_rest_seconds: 2
  hold_fraction: 0.5
  default_reference_hold_seconds: 6

baseline:
  prepare_seconds: 3

cues:
  enabled: false

timer:
  tick_interval_ms: 10

profile:
  owner: tester
"#
    .to_string()
}

/// Cue emitter that remembers everything announced
#[derive(Debug, Default)]
pub struct RecordingCues {
    texts: Mutex<Vec<String>>,
}

impl RecordingCues {
    /// Cues announced so far, in order
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl CueEmitter for RecordingCues {
    fn announce(&self, text: &str) {
        self.texts.lock().unwrap().push(text.to_string());
    }
}

/// Sink that keeps drafts in memory and stamps a fixed owner
#[derive(Debug, Default)]
pub struct MemorySink {
    drafts: Mutex<Vec<SessionDraft>>,
}

impl MemorySink {
    /// Drafts received so far
    pub fn drafts(&self) -> Vec<SessionDraft> {
        self.drafts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionSink for MemorySink {
    async fn create_session(&self, draft: SessionDraft) -> Result<SessionRecord> {
        let mut drafts = self.drafts.lock().unwrap();
        let record = SessionRecord {
            id: format!("memory-{}", drafts.len() + 1),
            owner: OwnerId::new("memory"),
            kind: draft.kind,
            occurred_at: draft.occurred_at,
            max_hold_seconds: draft.max_hold_seconds,
            target_hold_seconds: draft.target_hold_seconds,
            rounds_completed: draft.rounds_completed,
            outcome: draft.outcome,
            created_at: Utc::now(),
        };
        drafts.push(draft);
        Ok(record)
    }
}

/// Sink whose store is always unreachable
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

#[async_trait]
impl SessionSink for FailingSink {
    async fn create_session(&self, _draft: SessionDraft) -> Result<SessionRecord> {
        Err(TrainerError::Storage("store unreachable".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(TrainerError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_test_config_yaml_is_valid() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.profile.owner, "tester");
        assert!(!config.cues.enabled);
    }

    #[tokio::test]
    async fn test_failing_sink_errors() {
        let err = FailingSink
            .create_session(SessionDraft::baseline(Utc::now(), 10))
            .await
            .unwrap_err();
        assert_error_contains::<()>(Err(err), "store unreachable");
    }
}
