//! Command classification.
//!
//! Decides, in fixed precedence order, what a line of free text is:
//!
//! 1. **Hot command** - starts with a registered prefix (case-sensitive).
//!    The rest of the line, trimmed, is the script parameter.
//! 2. **Template** - starts with a registered phrase (case-insensitive).
//!    `{task}` in the template is replaced with the text after the phrase.
//! 3. **Agent** - everything else is forwarded to the language-model agent.
//!
//! Both tables are ordered lists; the first matching entry wins, and every
//! hot command is tried before any template.

use crate::error::{Error, Result};
use crate::types::ClassificationKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Placeholder substituted in template commands.
pub const TASK_PLACEHOLDER: &str = "{task}";

/// A registered prefix that launches an external scaffolding script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotCommand {
    /// Exact, case-sensitive prefix
    pub prefix: String,
    /// Stable identifier reported by the classifier
    pub script_id: String,
    /// Shown in help output
    #[serde(default)]
    pub description: String,
    /// Program to run (e.g. `python3`)
    pub program: String,
    /// Arguments placed before the extracted parameter
    #[serde(default)]
    pub args: Vec<String>,
}

/// A registered phrase mapped to a fixed shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCommand {
    /// Phrase matched case-insensitively at the start of the input
    pub key: String,
    /// Shell command; may contain `{task}`
    pub command: String,
}

/// Declarative, ordered command tables injected into the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTable {
    #[serde(default)]
    pub hot_commands: Vec<HotCommand>,
    #[serde(default)]
    pub templates: Vec<TemplateCommand>,
}

impl CommandTable {
    /// Built-in scaffolding hot commands and desktop templates.
    pub fn builtin() -> Self {
        let hot = |prefix: &str, id: &str, description: &str| HotCommand {
            prefix: prefix.to_string(),
            script_id: id.to_string(),
            description: description.to_string(),
            program: "python3".to_string(),
            args: vec![format!("scripts/{}.py", id)],
        };
        let template = |key: &str, command: &str| TemplateCommand {
            key: key.to_string(),
            command: command.to_string(),
        };

        Self {
            hot_commands: vec![
                hot("go adam nextjs", "scaffold_nextjs", "Scaffold a Next.js + Tailwind project"),
                hot("go adam golang", "scaffold_golang", "Scaffold a Golang + GORM backend project"),
                hot("go adam fullstack", "scaffold_fullstack", "Scaffold fullstack Next.js + Golang project"),
            ],
            templates: vec![
                template("show disk usage", "du -sh ~"),
                template("list files", "ls -lah"),
                template("move pdfs to archive", "mkdir -p archive && mv *.pdf archive/"),
                template(
                    "create folder with readme",
                    "mkdir project_folder && echo '# Project' > project_folder/README.md",
                ),
                template("open chrome", "/snap/bin/chromium &"),
                template("launch chrome", "/snap/bin/chromium &"),
                template("open vscode", "code ."),
                template("open terminal", "gnome-terminal &"),
                template("open slack", "/usr/bin/slack &"),
                template("open file manager", "nautilus . &"),
                template(
                    "move images from downloads to pictures",
                    "mkdir -p ~/Pictures/downloaded_images && mv ~/Downloads/*.{jpg,jpeg,png} ~/Pictures/downloaded_images/",
                ),
                template(
                    "delete duplicate files",
                    "rm ~/Downloads/*\\(1\\)* ~/Downloads/*\\(2\\)*",
                ),
            ],
        }
    }

    /// Reject entries that would match every input or run nothing.
    pub fn validate(&self) -> Result<()> {
        for hot in &self.hot_commands {
            if hot.prefix.trim().is_empty() {
                return Err(Error::Config(format!(
                    "hot command '{}' has an empty prefix",
                    hot.script_id
                )));
            }
            if hot.program.trim().is_empty() {
                return Err(Error::Config(format!(
                    "hot command '{}' has no program",
                    hot.script_id
                )));
            }
        }
        for template in &self.templates {
            if template.key.trim().is_empty() {
                return Err(Error::Config(format!(
                    "template '{}' has an empty key",
                    template.command
                )));
            }
        }
        Ok(())
    }
}

/// Result of classifying one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    HotCommand { script_id: String, parameter: String },
    Template { key: String, command: String },
    Agent { raw_input: String },
}

impl Classification {
    pub fn kind(&self) -> ClassificationKind {
        match self {
            Classification::HotCommand { .. } => ClassificationKind::HotCommand,
            Classification::Template { .. } => ClassificationKind::Template,
            Classification::Agent { .. } => ClassificationKind::Agent,
        }
    }
}

/// Prefix/phrase classifier over an injected [`CommandTable`].
#[derive(Debug, Clone)]
pub struct Classifier {
    table: CommandTable,
}

impl Classifier {
    pub fn new(table: CommandTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Look up the hot command registered under `script_id`.
    pub fn hot_command(&self, script_id: &str) -> Option<&HotCommand> {
        self.table
            .hot_commands
            .iter()
            .find(|h| h.script_id == script_id)
    }

    /// Classify `input`. Never fails: unmatched input goes to the agent.
    pub fn classify(&self, input: &str) -> Classification {
        for hot in &self.table.hot_commands {
            if let Some(rest) = input.strip_prefix(hot.prefix.as_str()) {
                debug!("Matched hot command {}", hot.script_id);
                return Classification::HotCommand {
                    script_id: hot.script_id.clone(),
                    parameter: rest.trim().to_string(),
                };
            }
        }

        for template in &self.table.templates {
            if let Some(rest) = strip_prefix_ignore_case(input, &template.key) {
                debug!("Matched template '{}'", template.key);
                return Classification::Template {
                    key: template.key.clone(),
                    command: template.command.replace(TASK_PLACEHOLDER, rest.trim()),
                };
            }
        }

        Classification::Agent {
            raw_input: input.to_string(),
        }
    }
}

/// `str::strip_prefix` with Unicode-aware case folding on the prefix only.
///
/// The returned remainder is a slice of the original input, so its casing
/// is preserved.
fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = input.char_indices();
    let mut end = 0;
    for expected in prefix.chars() {
        let (idx, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        end = idx + actual.len_utf8();
    }
    Some(&input[end..])
}
