//! wsa-core - Core library for the workspace agent
//!
//! This crate provides the pieces shared by the wsa SDK and CLI:
//!
//! - **db**: SQLite store for the task log, command memory and call notes
//! - **classifier**: Hot-command / template / agent routing
//! - **safety**: Destructive-command detection and confirmation
//! - **exec**: Shell execution with timeouts and script invocation
//! - **reminder**: Deferred desktop notifications
//! - **stats**: Task frequency and success summaries

pub mod classifier;
pub mod db;
pub mod error;
pub mod exec;
pub mod reminder;
pub mod safety;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use classifier::{Classification, Classifier, CommandTable, HotCommand, TemplateCommand};
pub use db::Database;
pub use error::{Error, Result};
pub use exec::{ExecResult, ShellExecutor};
pub use reminder::{DeferredExecution, ReminderScheduler};
pub use safety::{Confirmer, SafetyGate};
pub use types::ClassificationKind;
