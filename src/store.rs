//! Consultation log — append-only SQLite table of input/output pairs.
//!
//! One row per answered request, emergency short-circuits included. Rows are
//! never updated or deleted, and nothing in the service reads them back.
//! Each `record` opens its own connection in WAL mode with a busy timeout,
//! so concurrent requests queue for the write lock; async callers go through
//! [`ConsultationStore::record_async`], which runs the write on the blocking
//! pool.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use serde_json::Value;
use thiserror::Error;

const BUSY_TIMEOUT_MS: u32 = 5000;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS consultations (
    id        TEXT PRIMARY KEY,
    symptoms  TEXT NOT NULL,
    response  TEXT NOT NULL,
    timestamp TEXT NOT NULL
);
";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("consultation store: cannot open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("consultation store: write failed: {0}")]
    Write(String),
    #[error("consultation store: serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("consultation store: background task failed: {0}")]
    Task(String),
}

/// One persisted exchange.
#[derive(Debug, Clone)]
pub struct ConsultationRecord {
    pub symptoms: String,
    pub response: Value,
    pub timestamp: DateTime<Utc>,
}

impl ConsultationRecord {
    pub fn now(symptoms: impl Into<String>, response: Value) -> Self {
        Self { symptoms: symptoms.into(), response, timestamp: Utc::now() }
    }
}

/// Handle to the consultation database. Holds only the path: the file,
/// its directory and the table are created on first use, so an unavailable
/// disk fails individual writes rather than startup.
#[derive(Debug, Clone)]
pub struct ConsultationStore {
    db_path: PathBuf,
}

impl ConsultationStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self { db_path: db_path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Create the directory and table now instead of on the first write.
    pub fn init(&self) -> Result<(), StoreError> {
        self.connect().map(drop)
    }

    /// Append one record.
    pub fn record(&self, record: &ConsultationRecord) -> Result<(), StoreError> {
        let response = serde_json::to_string(&record.response)?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO consultations (id, symptoms, response, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                uuid::Uuid::now_v7().to_string(),
                record.symptoms,
                response,
                record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            ],
        )
        .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    /// [`record`](Self::record) on the blocking pool.
    pub async fn record_async(&self, record: ConsultationRecord) -> Result<(), StoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.record(&record))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Open {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        let conn = Connection::open(&self.db_path).map_err(|e| self.open_error(e))?;
        // Concurrent requests each hold a connection; wait for the writer lock.
        conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)
            .map_err(|e| self.open_error(e))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| self.open_error(e))?;
        conn.execute_batch(SCHEMA).map_err(|e| self.open_error(e))?;
        Ok(conn)
    }

    fn open_error(&self, e: rusqlite::Error) -> StoreError {
        StoreError::Open { path: self.db_path.clone(), reason: e.to_string() }
    }
}
