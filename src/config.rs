//! Configuration management for co2trainer
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TrainerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for co2trainer
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Training table parameters
    #[serde(default)]
    pub training: TrainingConfig,
    /// Baseline test parameters
    #[serde(default)]
    pub baseline: BaselineConfig,
    /// Spoken cue thresholds
    #[serde(default)]
    pub cues: CueConfig,
    /// Tick source settings
    #[serde(default)]
    pub timer: TimerConfig,
    /// Whose sessions are recorded
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Session database location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Training table configuration
///
/// Rest periods start at `initial_rest_seconds` and shrink by
/// `rest_decrement_seconds` after every completed hold; the table ends once
/// the next rest would fall below `minimum_rest_seconds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Length of the first rest period
    #[serde(default = "default_initial_rest")]
    pub initial_rest_seconds: u32,

    /// Amount the rest shrinks after each round
    #[serde(default = "default_rest_decrement")]
    pub rest_decrement_seconds: u32,

    /// Shortest rest that still starts a new round
    #[serde(default = "default_minimum_rest")]
    pub minimum_rest_seconds: u32,

    /// Fraction of the reference max hold used as the per-round hold
    #[serde(default = "default_hold_fraction")]
    pub hold_fraction: f64,

    /// Reference max hold used when no baseline is on record
    #[serde(default = "default_reference_hold")]
    pub default_reference_hold_seconds: u32,
}

fn default_initial_rest() -> u32 {
    90
}

fn default_rest_decrement() -> u32 {
    15
}

fn default_minimum_rest() -> u32 {
    15
}

fn default_hold_fraction() -> f64 {
    0.5
}

fn default_reference_hold() -> u32 {
    30
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            initial_rest_seconds: default_initial_rest(),
            rest_decrement_seconds: default_rest_decrement(),
            minimum_rest_seconds: default_minimum_rest(),
            hold_fraction: default_hold_fraction(),
            default_reference_hold_seconds: default_reference_hold(),
        }
    }
}

/// Baseline test configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Countdown before the hold starts
    #[serde(default = "default_prepare_seconds")]
    pub prepare_seconds: u32,
}

fn default_prepare_seconds() -> u32 {
    15
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            prepare_seconds: default_prepare_seconds(),
        }
    }
}

/// Spoken cue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueConfig {
    /// Emit cues at all
    #[serde(default = "default_cues_enabled")]
    pub enabled: bool,

    /// Seconds left in a rest when the "prepare" warning is given
    #[serde(default = "default_rest_warning")]
    pub rest_warning_seconds: u32,

    /// Seconds left in a rest when the final deep breath is prompted
    #[serde(default = "default_breath_prompt")]
    pub breath_prompt_seconds: u32,

    /// Count the last N seconds of a rest aloud
    #[serde(default = "default_rest_countdown")]
    pub rest_countdown_from: u32,

    /// Count the last N seconds of a hold aloud
    #[serde(default = "default_hold_countdown")]
    pub hold_countdown_from: u32,

    /// Seconds left in the baseline preparation when the deep breath is prompted
    #[serde(default = "default_prepare_prompt")]
    pub prepare_prompt_seconds: u32,
}

fn default_cues_enabled() -> bool {
    true
}

fn default_rest_warning() -> u32 {
    15
}

fn default_breath_prompt() -> u32 {
    6
}

fn default_rest_countdown() -> u32 {
    5
}

fn default_hold_countdown() -> u32 {
    10
}

fn default_prepare_prompt() -> u32 {
    12
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            enabled: default_cues_enabled(),
            rest_warning_seconds: default_rest_warning(),
            breath_prompt_seconds: default_breath_prompt(),
            rest_countdown_from: default_rest_countdown(),
            hold_countdown_from: default_hold_countdown(),
            prepare_prompt_seconds: default_prepare_prompt(),
        }
    }
}

/// Tick source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Period of one timer unit in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Profile configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Owner identifier stamped on every stored session
    #[serde(default = "default_owner")]
    pub owner: String,
}

fn default_owner() -> String {
    "local".to_string()
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Explicit database path; the platform data dir is used when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Additionally append logs to this file
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "co2trainer=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TrainerError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TrainerError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(owner) = std::env::var("CO2TRAINER_OWNER") {
            self.profile.owner = owner;
        }

        if let Ok(level) = std::env::var("CO2TRAINER_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json) = std::env::var("CO2TRAINER_LOG_JSON") {
            match json.parse::<bool>() {
                Ok(v) => self.logging.json_format = v,
                Err(_) => tracing::warn!("Invalid CO2TRAINER_LOG_JSON: {}", json),
            }
        }

        if let Ok(tick) = std::env::var("CO2TRAINER_TICK_MS") {
            if let Ok(value) = tick.parse() {
                self.timer.tick_interval_ms = value;
            } else {
                tracing::warn!("Invalid CO2TRAINER_TICK_MS: {}", tick);
            }
        }

        if let Ok(rest) = std::env::var("CO2TRAINER_INITIAL_REST") {
            if let Ok(value) = rest.parse() {
                self.training.initial_rest_seconds = value;
            } else {
                tracing::warn!("Invalid CO2TRAINER_INITIAL_REST: {}", rest);
            }
        }

        if let Ok(fraction) = std::env::var("CO2TRAINER_HOLD_FRACTION") {
            if let Ok(value) = fraction.parse() {
                self.training.hold_fraction = value;
            } else {
                tracing::warn!("Invalid CO2TRAINER_HOLD_FRACTION: {}", fraction);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(owner) = &cli.owner {
            self.profile.owner = owner.clone();
        }

        if let Some(db_path) = &cli.storage_path {
            tracing::debug!(db_path = %db_path, "Using storage path from CLI");
            self.storage.db_path = Some(PathBuf::from(db_path));
        }

        if cli.verbose {
            self.logging.level = "co2trainer=debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `TrainerError::Config` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        let training = &self.training;

        if training.initial_rest_seconds == 0 {
            return Err(TrainerError::Config(
                "training.initial_rest_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if training.rest_decrement_seconds == 0 {
            return Err(TrainerError::Config(
                "training.rest_decrement_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !(training.hold_fraction > 0.0 && training.hold_fraction <= 1.0) {
            return Err(TrainerError::Config(
                "training.hold_fraction must be between 0.0 and 1.0".to_string(),
            )
            .into());
        }

        if training.default_reference_hold_seconds == 0 {
            return Err(TrainerError::Config(
                "training.default_reference_hold_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.timer.tick_interval_ms == 0 {
            return Err(TrainerError::Config(
                "timer.tick_interval_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.profile.owner.trim().is_empty() {
            return Err(
                TrainerError::Config("profile.owner cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Duration of one timer unit
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timer.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.training.initial_rest_seconds, 90);
        assert_eq!(config.training.rest_decrement_seconds, 15);
        assert_eq!(config.training.minimum_rest_seconds, 15);
        assert_eq!(config.training.hold_fraction, 0.5);
        assert_eq!(config.training.default_reference_hold_seconds, 30);
        assert_eq!(config.baseline.prepare_seconds, 15);
        assert_eq!(config.timer.tick_interval_ms, 1000);
        assert_eq!(config.profile.owner, "local");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_decrement() {
        let mut config = Config::default();
        config.training.rest_decrement_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rest_decrement_seconds"));
    }

    #[test]
    fn test_config_validation_hold_fraction_bounds() {
        let mut config = Config::default();
        config.training.hold_fraction = 0.0;
        assert!(config.validate().is_err());

        config.training.hold_fraction = 1.5;
        assert!(config.validate().is_err());

        config.training.hold_fraction = f64::NAN;
        assert!(config.validate().is_err());

        config.training.hold_fraction = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_tick() {
        let mut config = Config::default();
        config.timer.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_owner() {
        let mut config = Config::default();
        config.profile.owner = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
training:
  initial_rest_seconds: 120
  rest_decrement_seconds: 10
  minimum_rest_seconds: 30
  hold_fraction: 0.6
baseline:
  prepare_seconds: 20
cues:
  enabled: false
profile:
  owner: alex
storage:
  db_path: /tmp/sessions.db
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.training.initial_rest_seconds, 120);
        assert_eq!(config.training.rest_decrement_seconds, 10);
        assert_eq!(config.training.minimum_rest_seconds, 30);
        assert_eq!(config.training.hold_fraction, 0.6);
        assert_eq!(config.training.default_reference_hold_seconds, 30);
        assert_eq!(config.baseline.prepare_seconds, 20);
        assert!(!config.cues.enabled);
        assert_eq!(config.cues.hold_countdown_from, 10);
        assert_eq!(config.profile.owner, "alex");
        assert_eq!(
            config.storage.db_path,
            Some(PathBuf::from("/tmp/sessions.db"))
        );
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let sample = Config::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/config/config.yaml"))
            .expect("sample config parses");
        let defaults = Config::default();
        assert_eq!(
            sample.training.initial_rest_seconds,
            defaults.training.initial_rest_seconds
        );
        assert_eq!(sample.training.hold_fraction, defaults.training.hold_fraction);
        assert_eq!(sample.cues.prepare_prompt_seconds, 12);
        assert_eq!(sample.profile.owner, defaults.profile.owner);
        assert_eq!(sample.storage.db_path, None);
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = Cli::default();
        let config = Config::load("/nonexistent/co2trainer.yaml", &cli).unwrap();
        assert_eq!(config.training.initial_rest_seconds, 90);
    }

    #[test]
    fn test_load_invalid_yaml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "training: [not, a, map]").unwrap();

        let err = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrainerError>(),
            Some(TrainerError::Config(_))
        ));
    }

    #[test]
    fn test_cli_overrides_win() {
        let cli = Cli {
            config: None,
            verbose: true,
            storage_path: Some("/tmp/override.db".to_string()),
            owner: Some("sam".to_string()),
            command: Commands::Stats { json: false },
        };
        let mut config = Config::default();
        config.apply_cli_overrides(&cli);

        assert_eq!(config.profile.owner, "sam");
        assert_eq!(
            config.storage.db_path,
            Some(PathBuf::from("/tmp/override.db"))
        );
        assert_eq!(config.logging.level, "co2trainer=debug");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        std::env::set_var("CO2TRAINER_OWNER", "env-owner");
        std::env::set_var("CO2TRAINER_TICK_MS", "250");
        std::env::set_var("CO2TRAINER_HOLD_FRACTION", "not-a-number");

        let mut config = Config::default();
        config.apply_env_vars();

        assert_eq!(config.profile.owner, "env-owner");
        assert_eq!(config.timer.tick_interval_ms, 250);
        assert_eq!(config.training.hold_fraction, 0.5);

        std::env::remove_var("CO2TRAINER_OWNER");
        std::env::remove_var("CO2TRAINER_TICK_MS");
        std::env::remove_var("CO2TRAINER_HOLD_FRACTION");
    }
}
