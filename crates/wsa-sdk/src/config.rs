//! SDK Configuration
//!
//! Defines configuration options for the workspace agent SDK.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use wsa_core::exec::AutoExecPolicy;
use wsa_core::CommandTable;

/// SDK configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SDKConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Hot-command and template tables, in precedence order
    pub commands: CommandTable,

    /// Shell executor configuration
    pub executor: ExecutorConfig,

    /// Command memory configuration
    pub memory: MemoryConfig,

    /// Language-model agent configuration
    pub agent: AgentConfig,

    /// Reminder configuration
    pub reminders: ReminderConfig,

    /// Which agent replies get executed
    pub auto_exec: AutoExecPolicy,

    /// Label added to every Command Record's tags (e.g. "cli", "voice")
    pub source_tag: String,

    /// Plain-text log that call summaries are appended to (optional)
    pub call_log_path: Option<PathBuf>,
}

impl Default for SDKConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("wsa.db"),
            commands: CommandTable::builtin(),
            executor: ExecutorConfig::default(),
            memory: MemoryConfig::default(),
            agent: AgentConfig::default(),
            reminders: ReminderConfig::default(),
            auto_exec: AutoExecPolicy::default(),
            source_tag: "cli".to_string(),
            call_log_path: None,
        }
    }
}

/// Shell executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Execution budget per command in seconds (default: 10)
    pub timeout_secs: u64,

    /// Shell used for `-c` invocation (default: sh)
    pub shell: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            shell: "sh".to_string(),
        }
    }
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Embedding provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Local all-MiniLM-L6-v2 via fastembed
    Fastembed,
    /// Deterministic feature hashing, no model download
    Hashing,
}

/// Command memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Default number of similar commands returned (default: 3)
    pub top_n: usize,

    /// Embedding provider (default: fastembed)
    pub embedder: EmbedderKind,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            embedder: EmbedderKind::Fastembed,
        }
    }
}

/// Language-model agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,

    /// Model name sent with each request
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// System instructions for command proposals
    pub instructions: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            instructions: crate::agent::COMMAND_INSTRUCTIONS.to_string(),
        }
    }
}

/// Deferred-execution facility selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFacilityKind {
    /// System `at` queue
    At,
    /// In-process tokio timer
    Timer,
}

/// Reminder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Facility reminders are handed to (default: at)
    pub facility: ReminderFacilityKind,

    /// Delay for follow-ups found in call summaries (default: 30)
    pub default_followup_minutes: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            facility: ReminderFacilityKind::At,
            default_followup_minutes: 30,
        }
    }
}

impl SDKConfig {
    /// Create a new SDK config with the given database path
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    /// Set the command tables
    pub fn with_commands(mut self, commands: CommandTable) -> Self {
        self.commands = commands;
        self
    }

    /// Set executor configuration
    pub fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    /// Set memory configuration
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    /// Set agent configuration
    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    /// Set reminder configuration
    pub fn with_reminders(mut self, reminders: ReminderConfig) -> Self {
        self.reminders = reminders;
        self
    }

    /// Set the auto-execution policy
    pub fn with_auto_exec(mut self, auto_exec: AutoExecPolicy) -> Self {
        self.auto_exec = auto_exec;
        self
    }

    /// Set the source tag
    pub fn with_source_tag(mut self, source_tag: impl Into<String>) -> Self {
        self.source_tag = source_tag.into();
        self
    }

    /// Set the call log file
    pub fn with_call_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.call_log_path = Some(path.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.executor.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "executor.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.memory.top_n == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "memory.top_n".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.source_tag.trim().is_empty() {
            return Err(ConfigValidationError::InvalidValue {
                field: "source_tag".into(),
                message: "must not be empty".into(),
            });
        }

        self.commands
            .validate()
            .map_err(|e| ConfigValidationError::InvalidCommands(e.to_string()))?;

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("invalid command table: {0}")]
    InvalidCommands(String),
}
