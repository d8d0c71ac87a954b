//! Configuration management for wsa.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. `WSA_CONFIG` (path to an alternate config file)
//! 2. Config file (`<data dir>/config.toml`)
//! 3. Default values
//!
//! Every section is optional. The command tables default to the built-in
//! hot commands and templates; listing `[[hot_commands]]` or `[[templates]]`
//! replaces the corresponding built-in list entirely.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wsa_core::exec::AutoExecPolicy;
use wsa_core::{CommandTable, HotCommand, TemplateCommand};
use wsa_sdk::{
    AgentConfig as SdkAgentConfig, EmbedderKind, ExecutorConfig as SdkExecutorConfig,
    MemoryConfig as SdkMemoryConfig, ReminderConfig as SdkReminderConfig, ReminderFacilityKind,
    SDKConfig,
};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Paths
    #[serde(default)]
    pub paths: PathsConfig,

    /// Shell execution settings
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Language-model agent settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Command memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Reminder settings
    #[serde(default)]
    pub reminders: RemindersConfig,

    /// Which agent replies are executed automatically
    #[serde(default)]
    pub auto_exec: AutoExecPolicy,

    /// Prefix → script table, checked first
    #[serde(default = "default_hot_commands")]
    pub hot_commands: Vec<HotCommand>,

    /// Phrase → shell command table
    #[serde(default = "default_templates")]
    pub templates: Vec<TemplateCommand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for wsa data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite database (default: `<data_dir>/wsa.db`)
    pub database: Option<PathBuf>,

    /// Call summary log (default: `<data_dir>/calls.log`)
    pub call_log: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Budget per shell command in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Shell used to run commands
    #[serde(default = "default_shell")]
    pub shell: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Replacement system instructions for command proposals
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Default number of similar commands
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// `fastembed` or `hashing`
    #[serde(default = "default_embedder")]
    pub embedder: EmbedderKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// `at` or `timer`
    #[serde(default = "default_facility")]
    pub facility: ReminderFacilityKind,

    /// Delay for follow-ups found in call summaries
    #[serde(default = "default_followup_minutes")]
    pub default_followup_minutes: u32,
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "wsa", "wsa") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wsa")
    }
}

fn default_timeout_secs() -> u64 {
    SdkExecutorConfig::default().timeout_secs
}

fn default_shell() -> String {
    SdkExecutorConfig::default().shell
}

fn default_api_base() -> String {
    SdkAgentConfig::default().api_base
}

fn default_model() -> String {
    SdkAgentConfig::default().model
}

fn default_api_key_env() -> String {
    SdkAgentConfig::default().api_key_env
}

fn default_top_n() -> usize {
    SdkMemoryConfig::default().top_n
}

fn default_embedder() -> EmbedderKind {
    if cfg!(feature = "embeddings") {
        EmbedderKind::Fastembed
    } else {
        EmbedderKind::Hashing
    }
}

fn default_facility() -> ReminderFacilityKind {
    SdkReminderConfig::default().facility
}

fn default_followup_minutes() -> u32 {
    SdkReminderConfig::default().default_followup_minutes
}

fn default_hot_commands() -> Vec<HotCommand> {
    CommandTable::builtin().hot_commands
}

fn default_templates() -> Vec<TemplateCommand> {
    CommandTable::builtin().templates
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database: None,
            call_log: None,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            shell: default_shell(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            instructions: None,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            embedder: default_embedder(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            facility: default_facility(),
            default_followup_minutes: default_followup_minutes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            executor: ExecutorConfig::default(),
            agent: AgentConfig::default(),
            memory: MemoryConfig::default(),
            reminders: RemindersConfig::default(),
            auto_exec: AutoExecPolicy::default(),
            hot_commands: default_hot_commands(),
            templates: default_templates(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Config::default()
        };

        Ok(config)
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("WSA_CONFIG") {
            PathBuf::from(path)
        } else {
            default_data_dir().join("config.toml")
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.paths
            .database
            .clone()
            .unwrap_or_else(|| self.paths.data_dir.join("wsa.db"))
    }

    pub fn call_log_path(&self) -> PathBuf {
        self.paths
            .call_log
            .clone()
            .unwrap_or_else(|| self.paths.data_dir.join("calls.log"))
    }

    pub fn command_table(&self) -> CommandTable {
        CommandTable {
            hot_commands: self.hot_commands.clone(),
            templates: self.templates.clone(),
        }
    }

    /// Convert into the SDK's runtime configuration.
    pub fn to_sdk_config(&self) -> SDKConfig {
        let mut agent = SdkAgentConfig {
            api_base: self.agent.api_base.clone(),
            model: self.agent.model.clone(),
            api_key_env: self.agent.api_key_env.clone(),
            ..SdkAgentConfig::default()
        };
        if let Some(instructions) = &self.agent.instructions {
            agent.instructions = instructions.clone();
        }

        SDKConfig::new(self.database_path())
            .with_commands(self.command_table())
            .with_executor(SdkExecutorConfig {
                timeout_secs: self.executor.timeout_secs,
                shell: self.executor.shell.clone(),
            })
            .with_memory(SdkMemoryConfig {
                top_n: self.memory.top_n,
                embedder: self.memory.embedder,
            })
            .with_agent(agent)
            .with_reminders(SdkReminderConfig {
                facility: self.reminders.facility,
                default_followup_minutes: self.reminders.default_followup_minutes,
            })
            .with_auto_exec(self.auto_exec.clone())
            .with_source_tag("cli")
            .with_call_log(self.call_log_path())
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.paths.data_dir)
            .context("Failed to create data directory")?;
        for file in [self.database_path(), self.call_log_path()] {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.executor.timeout_secs, 10);
        assert_eq!(config.executor.shell, "sh");
        assert_eq!(config.memory.top_n, 3);
        assert_eq!(config.reminders.facility, ReminderFacilityKind::At);
        assert_eq!(config.reminders.default_followup_minutes, 30);
        assert_eq!(config.hot_commands.len(), 3);
        assert!(config.templates.iter().any(|t| t.key == "show disk usage"));
        assert_eq!(config.database_path(), config.paths.data_dir.join("wsa.db"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.command_table(), CommandTable::builtin());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[executor]
timeout_secs = 5

[memory]
embedder = "hashing"

[reminders]
facility = "timer"

[[templates]]
key = "show uptime"
command = "uptime"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.executor.timeout_secs, 5);
        assert_eq!(config.executor.shell, "sh");
        assert_eq!(config.memory.embedder, EmbedderKind::Hashing);
        assert_eq!(config.memory.top_n, 3);
        assert_eq!(config.reminders.facility, ReminderFacilityKind::Timer);
        assert_eq!(config.templates.len(), 1);
        assert_eq!(config.templates[0].command, "uptime");
        assert_eq!(config.hot_commands, CommandTable::builtin().hot_commands);
        assert!(config.auto_exec.leading_tokens.iter().any(|t| t == "ls"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[executor]\ntimeout_secs = \"soon\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_to_sdk_config() {
        let temp = tempdir().unwrap();
        let mut config = Config::default();
        config.paths.data_dir = temp.path().to_path_buf();
        config.agent.model = "local-model".to_string();
        config.agent.instructions = Some("only answer with commands".to_string());

        let sdk = config.to_sdk_config();
        assert_eq!(sdk.database_path, temp.path().join("wsa.db"));
        assert_eq!(sdk.call_log_path, Some(temp.path().join("calls.log")));
        assert_eq!(sdk.agent.model, "local-model");
        assert_eq!(sdk.agent.instructions, "only answer with commands");
        assert_eq!(sdk.source_tag, "cli");
        assert!(sdk.validate().is_ok());
    }

    #[test]
    fn test_ensure_dirs_creates_directories() {
        let temp = tempdir().unwrap();
        let mut config = Config::default();
        config.paths.data_dir = temp.path().join("data");
        config.paths.call_log = Some(temp.path().join("logs").join("calls.log"));

        assert!(!config.paths.data_dir.exists());
        config.ensure_dirs().unwrap();

        assert!(config.paths.data_dir.exists());
        assert!(temp.path().join("logs").exists());
    }
}
