//! Error types for co2trainer
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for co2trainer operations
///
/// Covers configuration loading, protocol validation and session storage.
/// Persistence failures at the end of a run are reported through
/// [`crate::timer::host::Persistence::Failed`] rather than surfaced as errors.
#[derive(Error, Debug)]
pub enum TrainerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Training protocol parameters that cannot produce a finite run
    #[error("Invalid training protocol: {0}")]
    Protocol(String),

    /// Session storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored value could not be mapped back into the session model
    #[error("Corrupt session record {id}: {message}")]
    CorruptRecord {
        /// Identifier of the offending row
        id: String,
        /// What failed to parse
        message: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for co2trainer operations
///
/// Uses `anyhow::Error` so callers can attach context while the concrete
/// [`TrainerError`] stays reachable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = TrainerError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_protocol_error_display() {
        let error = TrainerError::Protocol("rest_decrement must be greater than 0".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid training protocol: rest_decrement must be greater than 0"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let error = TrainerError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_corrupt_record_display() {
        let error = TrainerError::CorruptRecord {
            id: "abc".to_string(),
            message: "unknown kind 'nap'".to_string(),
        };
        let s = error.to_string();
        assert!(s.contains("abc"));
        assert!(s.contains("unknown kind 'nap'"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: TrainerError = io_error.into();
        assert!(matches!(error, TrainerError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: TrainerError = yaml_error.into();
        assert!(matches!(error, TrainerError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrainerError>();
    }

    #[test]
    fn test_downcast_through_result_alias() {
        let result: Result<()> = Err(TrainerError::Config("bad".to_string()).into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrainerError>(),
            Some(TrainerError::Config(_))
        ));
    }
}
