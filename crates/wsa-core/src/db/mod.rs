//! Direct SQLite database access for wsa.
//!
//! One `Database` is opened at startup and shared (behind an `Arc`) by the
//! pipeline, the command memory and the pattern learner. Every operation is a
//! single statement executed under the connection lock, so concurrent callers
//! are serialized and no transaction spans an agent or shell call.

use crate::error::{Error, Result};
use crate::types::{
    parse_timestamp, split_tags, CallSummary, ClassificationKind, CommandMemoryRow,
    NewCallSummary, NewCommandMemory, NewTaskLog, SuccessfulTask, TaskLogEntry,
};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Schema for all wsa tables.
pub const INITIAL_SQL: &str = include_str!("migrations/001_initial.sql");

/// Database connection wrapper.
///
/// Thread-safe via internal Mutex. All database operations acquire the lock.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file at `path` and run migrations.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(Error::Database)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        debug!("Opened database at {:?}", path);
        Self::init(conn)
    }

    /// Open a private in-memory database (tests, dry runs).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::Database)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(INITIAL_SQL)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Check database connectivity
    pub fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute_batch("SELECT 1").map_err(Error::Database)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Task Log Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a Command Record.
    pub fn insert_task_log(&self, entry: &NewTaskLog) -> Result<i64> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute(
            "INSERT INTO task_log (timestamp, task, tags, classification, output, success)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.timestamp.to_rfc3339(),
                entry.task,
                entry.tags.join(","),
                entry.classification.as_str(),
                entry.output,
                entry.success,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List Command Records in insertion order, optionally only the last `limit`.
    pub fn list_task_log(&self, limit: Option<usize>) -> Result<Vec<TaskLogEntry>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut entries = match limit {
            Some(limit) => {
                let mut stmt = conn.prepare(
                    "SELECT id, timestamp, task, tags, classification, output, success
                     FROM task_log ORDER BY id DESC LIMIT ?1",
                )?;
                stmt.query_map(params![limit as i64], Self::map_task_log)?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, timestamp, task, tags, classification, output, success
                     FROM task_log ORDER BY id DESC",
                )?;
                stmt.query_map([], Self::map_task_log)?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        entries.reverse();
        Ok(entries)
    }

    /// Tasks logged at or after `since`, newest first.
    pub fn recent_tasks(&self, since: DateTime<Local>) -> Result<Vec<TaskLogEntry>> {
        let mut entries = self.list_task_log(None)?;
        entries.retain(|e| parse_timestamp(&e.timestamp).is_some_and(|ts| ts >= since));
        entries.reverse();
        Ok(entries)
    }

    /// Successful tasks in chronological order, each with the most recent
    /// non-empty feedback recorded for the identical command text.
    pub fn successful_tasks_with_feedback(&self) -> Result<Vec<SuccessfulTask>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT t.timestamp, t.task,
                    (SELECT m.feedback FROM command_memory m
                     WHERE m.command = t.task AND m.feedback IS NOT NULL AND m.feedback != ''
                     ORDER BY m.id DESC LIMIT 1)
             FROM task_log t
             WHERE t.success = 1
             ORDER BY t.timestamp, t.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SuccessfulTask {
                    timestamp: row.get(0)?,
                    task: row.get(1)?,
                    feedback: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_task_log(row: &rusqlite::Row) -> rusqlite::Result<TaskLogEntry> {
        let tags: String = row.get(3)?;
        let classification: Option<String> = row.get(4)?;
        Ok(TaskLogEntry {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            task: row.get(2)?,
            tags: split_tags(&tags),
            classification: classification.as_deref().and_then(ClassificationKind::from_str),
            output: row.get(5)?,
            success: row.get(6)?,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command Memory Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a Memory Entry. Entries are never updated or deleted.
    pub fn insert_command_memory(&self, entry: &NewCommandMemory) -> Result<i64> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute(
            "INSERT INTO command_memory (timestamp, command, output, feedback, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Local::now().to_rfc3339(),
                entry.command,
                entry.output,
                entry.feedback,
                entry.embedding,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All Memory Entries in insertion order.
    pub fn list_command_memory(&self) -> Result<Vec<CommandMemoryRow>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, command, output, feedback, embedding
             FROM command_memory ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CommandMemoryRow {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    command: row.get(2)?,
                    output: row.get(3)?,
                    feedback: row.get(4)?,
                    embedding: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Output of the most recent Memory Entry for `command`, if any.
    pub fn latest_output_for(&self, command: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(conn
            .query_row(
                "SELECT output FROM command_memory WHERE command = ?1 ORDER BY id DESC LIMIT 1",
                params![command],
                |row| row.get(0),
            )
            .optional()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Call Memory Operations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn insert_call_summary(&self, entry: &NewCallSummary) -> Result<i64> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute(
            "INSERT INTO call_memory (timestamp, raw_text, summary, reminder, confirmed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Local::now().to_rfc3339(),
                entry.raw_text,
                entry.summary,
                entry.reminder,
                entry.confirmed,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent call summaries, newest first.
    pub fn list_call_summaries(&self, limit: usize) -> Result<Vec<CallSummary>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, raw_text, summary, reminder, confirmed
             FROM call_memory ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(CallSummary {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    raw_text: row.get(2)?,
                    summary: row.get(3)?,
                    reminder: row.get(4)?,
                    confirmed: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
