//! Output artifacts: rendered reports, line files and the SQLite archive.

/// Line files (text log, summary CSV, JSON dump).
pub mod file;
/// Text log and summary line rendering.
pub mod render;
/// SQLite activation archive.
pub mod sqlite;

use thiserror::Error;

use crate::qso::TimedLog;

/// Failure writing or reading an output artifact.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// JSON encode/decode error.
    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Anything else.
    #[error("{0}")]
    Message(String),
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Destination for a finished log.
pub trait LogSink: Send {
    /// Writes one timed log.
    fn write_log(&mut self, log: &TimedLog) -> PersistResult<()>;
    /// Makes previous writes durable.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}
