//! Shared types for wsa-core.
//!
//! These types are used by the database layer, the pipeline and the CLI.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Parse a stored ISO-8601 timestamp into local time.
///
/// Accepts RFC 3339 with an offset (what this crate writes) and offset-less
/// `YYYY-MM-DDTHH:MM:SS[.fff]` values, which are read as local wall time.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Split a comma-joined tag column into trimmed, non-empty labels.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Which path an input took through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationKind {
    /// Registered prefix mapped to an external scaffolding script
    HotCommand,
    /// Registered phrase mapped to a fixed shell command
    Template,
    /// Forwarded to the language-model agent
    Agent,
    /// Logged by hand, never classified
    Manual,
}

impl ClassificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationKind::HotCommand => "hot_command",
            ClassificationKind::Template => "template",
            ClassificationKind::Agent => "agent",
            ClassificationKind::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hot_command" => Some(ClassificationKind::HotCommand),
            "template" => Some(ClassificationKind::Template),
            "agent" => Some(ClassificationKind::Agent),
            "manual" => Some(ClassificationKind::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entity Types
// ─────────────────────────────────────────────────────────────────────────────

/// One row of `task_log`: the Command Record of a processed input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLogEntry {
    pub id: i64,
    /// ISO-8601 with local offset
    pub timestamp: String,
    pub task: String,
    pub tags: Vec<String>,
    pub classification: Option<ClassificationKind>,
    pub output: String,
    pub success: bool,
}

/// One row of `command_memory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMemoryRow {
    pub id: i64,
    pub timestamp: String,
    pub command: String,
    pub output: String,
    pub feedback: Option<String>,
    /// Raw little-endian f32 bytes
    #[serde(skip)]
    pub embedding: Vec<u8>,
}

/// One row of `call_memory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSummary {
    pub id: i64,
    pub timestamp: String,
    pub raw_text: String,
    pub summary: String,
    pub reminder: Option<String>,
    pub confirmed: bool,
}

/// A successful task joined with the most recent feedback for its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessfulTask {
    pub timestamp: String,
    pub task: String,
    pub feedback: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Input Types (for creating entities)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewTaskLog {
    pub timestamp: DateTime<Local>,
    pub task: String,
    pub tags: Vec<String>,
    pub classification: ClassificationKind,
    pub output: String,
    pub success: bool,
}

impl NewTaskLog {
    /// Build a record stamped with the current local time.
    pub fn now(
        task: impl Into<String>,
        classification: ClassificationKind,
        tags: Vec<String>,
        output: impl Into<String>,
        success: bool,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            task: task.into(),
            tags,
            classification,
            output: output.into(),
            success,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCommandMemory {
    pub command: String,
    pub output: String,
    pub feedback: Option<String>,
    pub embedding: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewCallSummary {
    pub raw_text: String,
    pub summary: String,
    pub reminder: Option<String>,
    pub confirmed: bool,
}
