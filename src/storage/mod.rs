use crate::error::{Result, TrainerError};
use crate::session::{OwnerId, SessionDraft, SessionKind, SessionOutcome, SessionRecord};
use crate::timer::host::{ReferenceSource, SessionSink};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Environment variable that points the store at a different database file
pub const DB_PATH_ENV: &str = "CO2TRAINER_DB";

/// Storage backend for session records
///
/// Records are append-only: the store creates and lists them but never
/// updates or deletes.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db_path: PathBuf,
}

/// Columns exactly as stored, before they are mapped into the model
struct SessionRow {
    id: String,
    owner: String,
    kind: String,
    occurred_at: String,
    max_hold_seconds: Option<u32>,
    target_hold_seconds: Option<u32>,
    rounds_completed: Option<u32>,
    outcome: String,
    created_at: String,
}

impl SessionRow {
    fn into_record(self) -> std::result::Result<SessionRecord, TrainerError> {
        let corrupt = |message: String| TrainerError::CorruptRecord {
            id: self.id.clone(),
            message,
        };
        let kind: SessionKind = self.kind.parse().map_err(corrupt)?;
        let outcome: SessionOutcome = self.outcome.parse().map_err(corrupt)?;
        let occurred_at = parse_timestamp(&self.occurred_at).map_err(corrupt)?;
        let created_at = parse_timestamp(&self.created_at).map_err(corrupt)?;

        Ok(SessionRecord {
            id: self.id,
            owner: OwnerId::new(self.owner),
            kind,
            occurred_at,
            max_hold_seconds: self.max_hold_seconds,
            target_hold_seconds: self.target_hold_seconds,
            rounds_completed: self.rounds_completed,
            outcome,
            created_at,
        })
    }
}

fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{}': {}", value, e))
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory unless
    /// `CO2TRAINER_DB` names another file.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var(DB_PATH_ENV) {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "co2trainer", "co2trainer")
            .ok_or_else(|| TrainerError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| TrainerError::Storage(e.to_string()))?;

        let storage = Self {
            db_path: data_dir.join("sessions.db"),
        };
        storage.init()?;

        Ok(storage)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use co2trainer::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("sessions.db")).unwrap();
    /// assert!(storage.db_path().exists());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| TrainerError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Open the configured database, or the default one
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::new_with_path(path),
            None => Self::new(),
        }
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| TrainerError::Storage(e.to_string()))?)
    }

    fn init(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                kind TEXT NOT NULL,
                occurred_at TEXT NOT NULL,
                max_hold_seconds INTEGER,
                target_hold_seconds INTEGER,
                rounds_completed INTEGER,
                outcome TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_owner_occurred
                ON sessions (owner, occurred_at);",
        )
        .context("Failed to create tables")
        .map_err(|e| TrainerError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Store a finished session for `owner`
    ///
    /// The owner comes from the caller, never from the draft. The store
    /// assigns the identifier and creation time.
    pub fn create_session(&self, owner: &OwnerId, draft: SessionDraft) -> Result<SessionRecord> {
        let conn = self.connect()?;

        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            owner: owner.clone(),
            kind: draft.kind,
            occurred_at: draft.occurred_at,
            max_hold_seconds: draft.max_hold_seconds,
            target_hold_seconds: draft.target_hold_seconds,
            rounds_completed: draft.rounds_completed,
            outcome: draft.outcome,
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO sessions (id, owner, kind, occurred_at, max_hold_seconds,
                target_hold_seconds, rounds_completed, outcome, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id,
                record.owner.as_str(),
                record.kind.as_str(),
                record.occurred_at.to_rfc3339(),
                record.max_hold_seconds,
                record.target_hold_seconds,
                record.rounds_completed,
                record.outcome.as_str(),
                record.created_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert session")
        .map_err(|e| TrainerError::Storage(e.to_string()))?;

        tracing::debug!(id = %record.id, owner = %record.owner, kind = %record.kind, "Session stored");
        Ok(record)
    }

    /// List the sessions of `owner`, most recent first
    ///
    /// Rows that no longer map onto the session model are skipped with a
    /// warning.
    pub fn list_sessions(&self, owner: &OwnerId) -> Result<Vec<SessionRecord>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, owner, kind, occurred_at, max_hold_seconds, target_hold_seconds,
                    rounds_completed, outcome, created_at
                FROM sessions
                WHERE owner = ?
                ORDER BY occurred_at DESC, created_at DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| TrainerError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![owner.as_str()], |row| {
                Ok(SessionRow {
                    id: row.get(0)?,
                    owner: row.get(1)?,
                    kind: row.get(2)?,
                    occurred_at: row.get(3)?,
                    max_hold_seconds: row.get(4)?,
                    target_hold_seconds: row.get(5)?,
                    rounds_completed: row.get(6)?,
                    outcome: row.get(7)?,
                    created_at: row.get(8)?,
                })
            })
            .context("Failed to query sessions")
            .map_err(|e| TrainerError::Storage(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            let row = row
                .context("Failed to read session row")
                .map_err(|e| TrainerError::Storage(e.to_string()))?;
            match row.into_record() {
                Ok(record) => sessions.push(record),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable session"),
            }
        }

        Ok(sessions)
    }

    /// Longest positive baseline hold `owner` has recorded
    pub fn best_baseline(&self, owner: &OwnerId) -> Result<Option<u32>> {
        let conn = self.connect()?;

        let best: Option<u32> = conn
            .query_row(
                "SELECT MAX(max_hold_seconds) FROM sessions
                WHERE owner = ? AND kind = ? AND max_hold_seconds > 0",
                params![owner.as_str(), SessionKind::Baseline.as_str()],
                |row| row.get(0),
            )
            .context("Failed to query best baseline")
            .map_err(|e| TrainerError::Storage(e.to_string()))?;

        Ok(best)
    }
}

/// A store bound to the principal whose runs it records
///
/// This is what a [`crate::timer::SessionHost`] persists through; the owner
/// is fixed when the sink is built.
#[derive(Debug, Clone)]
pub struct OwnedSessionSink {
    storage: SqliteStorage,
    owner: OwnerId,
}

impl OwnedSessionSink {
    /// Bind `storage` to `owner`
    pub fn new(storage: SqliteStorage, owner: OwnerId) -> Self {
        Self { storage, owner }
    }

    /// The principal records are stamped with
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Sessions of the bound owner, most recent first
    pub fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.storage.list_sessions(&self.owner)
    }
}

#[async_trait]
impl SessionSink for OwnedSessionSink {
    async fn create_session(&self, draft: SessionDraft) -> Result<SessionRecord> {
        let storage = self.storage.clone();
        let owner = self.owner.clone();
        tokio::task::spawn_blocking(move || storage.create_session(&owner, draft))
            .await
            .map_err(|e| TrainerError::Storage(format!("Storage task failed: {}", e)))?
    }
}

impl ReferenceSource for OwnedSessionSink {
    fn reference_max_hold(&self) -> Result<Option<u32>> {
        self.storage.best_baseline(&self.owner)
    }
}
