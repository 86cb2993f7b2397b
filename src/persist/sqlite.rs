//! SQLite archive of converted activations.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::qso::TimedLog;

use super::{LogSink, PersistError, PersistResult};

const ARCHIVE_FORMAT_VERSION: u16 = 1;

/// Row id of an archived activation.
pub type ActivationId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArchiveEnvelope {
    format_version: u16,
    log: TimedLog,
}

/// Archived contact row, as returned by [`SqliteArchive::contacts_by_call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedContact {
    /// Activation the contact belongs to.
    pub activation_id: ActivationId,
    /// Activated summit.
    pub my_reference: String,
    /// Activation date, `YYYY-MM-DD`.
    pub date: String,
    /// Resolved UTC time, `HHMM`.
    pub zulu: String,
    /// True when the time was interpolated.
    pub interpolated: bool,
}

/// Append-only activation archive.
pub struct SqliteArchive {
    conn: Connection,
    source: Option<String>,
}

impl SqliteArchive {
    /// Opens or creates an archive at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory archive.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn, source: None })
    }

    /// Records `source` (usually the input file name) on subsequent [`LogSink`] writes.
    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    /// Stores one activation and its contacts in a single transaction.
    pub fn append_activation(
        &mut self,
        log: &TimedLog,
        source: Option<&str>,
    ) -> PersistResult<ActivationId> {
        let payload = serde_json::to_vec(&ArchiveEnvelope {
            format_version: ARCHIVE_FORMAT_VERSION,
            log: log.clone(),
        })?;
        let p = &log.preamble;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO activations(my_call, my_reference, date, utc_offset, source, imported_ms, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                p.my_call.as_str(),
                p.my_reference.to_string(),
                p.date.format("%Y-%m-%d").to_string(),
                p.utc_offset,
                source,
                now_ms() as i64,
                payload,
            ],
        )?;
        let id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO contacts(activation_id, seq, their_call, zulu, interpolated, frequency, mode, their_reference)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (seq, contact) in log.contacts.iter().enumerate() {
                let rec = &contact.record;
                stmt.execute(params![
                    id,
                    seq as i64,
                    rec.their_call.as_str(),
                    contact.zulu.to_string(),
                    contact.interpolated,
                    rec.frequency.map(|f| f.mhz()),
                    rec.mode.map(|m| m.as_str()),
                    rec.their_reference.as_ref().map(|r| r.to_string()),
                ])?;
            }
        }
        tx.commit()?;
        Ok(id)
    }

    /// Archived activation ids in insertion order.
    pub fn activation_ids(&self) -> PersistResult<Vec<ActivationId>> {
        let mut stmt = self.conn.prepare("SELECT id FROM activations ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Loads the timed log stored under `id`.
    pub fn load_activation(&self, id: ActivationId) -> PersistResult<Option<TimedLog>> {
        let payload: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT payload FROM activations WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let env: ArchiveEnvelope = serde_json::from_slice(&payload)?;
        if env.format_version != ARCHIVE_FORMAT_VERSION {
            return Err(PersistError::Message(format!(
                "unsupported archive format version: {}",
                env.format_version
            )));
        }
        Ok(Some(env.log))
    }

    /// Every archived contact with `call`, oldest activation first.
    pub fn contacts_by_call(&self, call: &str) -> PersistResult<Vec<ArchivedContact>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.activation_id, a.my_reference, a.date, c.zulu, c.interpolated
             FROM contacts c JOIN activations a ON a.id = c.activation_id
             WHERE c.their_call = ?1
             ORDER BY c.activation_id ASC, c.seq ASC",
        )?;
        let rows = stmt.query_map(params![call.to_ascii_uppercase()], |row| {
            Ok(ArchivedContact {
                activation_id: row.get(0)?,
                my_reference: row.get(1)?,
                date: row.get(2)?,
                zulu: row.get(3)?,
                interpolated: row.get(4)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl LogSink for SqliteArchive {
    fn write_log(&mut self, log: &TimedLog) -> PersistResult<()> {
        let source = self.source.clone();
        self.append_activation(log, source.as_deref())?;
        Ok(())
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
