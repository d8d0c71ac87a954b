//! Workspace agent SDK
//!
//! Everything a front end (CLI, voice loop, desktop shell) needs to turn
//! free text into shell actions:
//!
//! # Core Modules (from wsa-core)
//!
//! - **db** - SQLite store for the task log, command memory and call notes
//! - **classifier** - Hot-command / template / agent routing
//! - **safety** - Destructive-action detection and confirmation
//! - **exec** - Bounded shell execution and script invocation
//! - **reminder** - Fire-and-forget notifications
//!
//! # SDK Modules
//!
//! - **memory** - Embedding-backed command memory with similarity search
//! - **patterns** - Weekday routine patterns mined from successful tasks
//! - **agent** - Language-model agent client
//! - **calls** - Call transcript sessions and summaries
//! - **pipeline** - The `process(input, confirmer)` orchestrator
//!
//! # Example
//!
//! ```rust,no_run
//! use wsa_sdk::{SDKConfig, Workspace};
//! use wsa_core::safety::StaticConfirmer;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let workspace = Workspace::new(SDKConfig::new("wsa.db"))?;
//!     let outcome = workspace.process("go adam nextjs storefront", &StaticConfirmer(false)).await;
//!     println!("{} ({:?})", outcome.output, outcome.status);
//!     Ok(())
//! }
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Re-export core modules from wsa-core
// ─────────────────────────────────────────────────────────────────────────────

/// Command classification
pub use wsa_core::classifier;

/// Database access
pub use wsa_core::db;

/// Shell execution
pub use wsa_core::exec;

/// Deferred notifications
pub use wsa_core::reminder;

/// Destructive-action gate
pub use wsa_core::safety;

/// Task statistics
pub use wsa_core::stats;

/// Core types (TaskLogEntry, ClassificationKind, etc.)
pub use wsa_core::types;

/// Error types from core
pub use wsa_core::error as core_error;

// ─────────────────────────────────────────────────────────────────────────────
// SDK-specific modules
// ─────────────────────────────────────────────────────────────────────────────

pub mod agent;
pub mod calls;
pub mod memory;
pub mod patterns;
pub mod pipeline;

mod config;
mod error;
mod sdk;

// Re-export main SDK types
pub use config::{
    AgentConfig, ConfigValidationError, EmbedderKind, ExecutorConfig, MemoryConfig,
    ReminderConfig, ReminderFacilityKind, SDKConfig,
};
pub use error::{SDKError, SDKResult};
pub use sdk::Workspace;

pub use agent::{LanguageModelAgent, OpenAiAgent};
pub use calls::{CallReport, CallSession, CallSummarizer};
pub use memory::{CommandMemory, Embedder, SimilarCommand};
pub use patterns::{PatternLearner, RoutinePatterns};
pub use pipeline::{OutcomeStatus, Pipeline, ProcessOutcome};
