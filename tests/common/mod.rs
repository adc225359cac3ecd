use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use co2trainer::storage::SqliteStorage;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SqliteStorage, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("sessions.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// A four-tick-rest table with 10ms ticks, so runs finish in well under a second
#[allow(dead_code)]
pub const FAST_CONFIG: &str = r#"
training:
  initial_rest_seconds: 4
  rest_decrement_seconds: 2
  minimum_rest_seconds: 2
  hold_fraction: 0.5
  default_reference_hold_seconds: 6

cues:
  enabled: false

timer:
  tick_interval_ms: 10

profile:
  owner: tester
"#;
