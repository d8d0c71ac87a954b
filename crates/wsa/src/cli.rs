//! CLI argument definitions using clap derive macros.
//!
//! Free text on the command line goes straight to the pipeline; the
//! subcommands cover memory, routines, reminders and calls.

use clap::{Parser, Subcommand};
use wsa_core::CommandTable;

/// Workspace agent
///
/// Turns free text into shell actions. Known phrases run directly, anything
/// else is handed to the language-model agent.
#[derive(Parser, Debug)]
#[command(name = "wsa")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Request to run, read interactively when omitted. Use `wsa run <TEXT>` when it starts with a subcommand name such as "call" or "remind"
    #[arg(value_name = "TEXT", trailing_var_arg = true)]
    pub input: Vec<String>,

    /// Approve destructive actions without asking
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a request through the pipeline
    Run {
        /// Approve destructive actions without asking
        #[arg(short, long)]
        yes: bool,

        /// Request text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Show remembered commands similar to a query
    Similar {
        /// Query text
        #[arg(required = true)]
        query: Vec<String>,

        /// Number of results (defaults to memory.top_n)
        #[arg(short, long)]
        top: Option<usize>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show routine tasks per weekday
    Patterns,

    /// Suggest today's usual tasks
    Nudge {
        /// Schedule a reminder for the first suggestion this many minutes from now
        #[arg(short, long)]
        remind: Option<u32>,
    },

    /// Log a task by hand
    Log {
        /// Task description
        task: String,

        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Record the task as failed
        #[arg(long)]
        failed: bool,
    },

    /// Show task log statistics
    Stats {
        /// Rows shown per table
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Schedule a reminder notification
    Remind {
        /// What to be reminded of
        #[arg(required = true)]
        task: Vec<String>,

        /// Minutes from now
        #[arg(short, long, default_value_t = 30)]
        minutes: u32,
    },

    /// Attach feedback to a remembered command
    Feedback {
        /// Command text exactly as it was run
        command: String,

        /// Feedback text (containing "no" hides the task from routines)
        #[arg(required = true, trailing_var_arg = true)]
        feedback: Vec<String>,
    },

    /// Summarize a call transcript (one snippet per line, `-` for stdin)
    Call {
        /// Transcript file
        source: String,
    },

    /// Run diagnostics
    Doctor,
}

/// Join positional words back into one line.
pub fn join_words(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

/// Help footer listing the configured hot commands and templates.
pub fn command_listing(table: &CommandTable) -> String {
    let mut text = String::from("Hot commands:\n");
    for hot in &table.hot_commands {
        text.push_str(&format!("  {} <name>", hot.prefix));
        if !hot.description.is_empty() {
            text.push_str(&format!("  {}", hot.description));
        }
        text.push('\n');
    }

    text.push_str("\nTemplates:\n");
    for template in &table.templates {
        text.push_str(&format!("  {:<24} {}\n", template.key, template.command));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_free_text_is_not_a_subcommand() {
        let cli = Cli::try_parse_from(["wsa", "show", "disk", "usage"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(join_words(&cli.input), "show disk usage");
    }

    #[test]
    fn test_yes_before_free_text() {
        let cli = Cli::try_parse_from(["wsa", "-y", "rm", "-rf", "build"]).unwrap();
        assert!(cli.yes);
        assert!(cli.command.is_none());
        assert_eq!(join_words(&cli.input), "rm -rf build");
    }

    #[test]
    fn test_run_accepts_text_starting_with_subcommand_name() {
        let cli = Cli::try_parse_from(["wsa", "run", "remind", "me", "to", "stretch"]).unwrap();
        match cli.command {
            Some(Commands::Run { yes, text }) => {
                assert!(!yes);
                assert_eq!(join_words(&text), "remind me to stretch");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let help = Cli::command().render_help().to_string();
        assert!(help.contains("wsa run <TEXT>"));
    }

    #[test]
    fn test_subcommand_parsing() {
        let cli = Cli::try_parse_from(["wsa", "similar", "open", "chrome", "--top", "5"]).unwrap();
        match cli.command {
            Some(Commands::Similar { query, top, json }) => {
                assert_eq!(join_words(&query), "open chrome");
                assert_eq!(top, Some(5));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["wsa", "log", "review PRs", "--tags", "work,code"]).unwrap();
        match cli.command {
            Some(Commands::Log { task, tags, failed }) => {
                assert_eq!(task, "review PRs");
                assert_eq!(tags, vec!["work", "code"]);
                assert!(!failed);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_command_listing() {
        let listing = command_listing(&CommandTable::builtin());
        assert!(listing.starts_with("Hot commands:"));
        assert!(listing.contains("go adam nextjs <name>"));
        assert!(listing.contains("show disk usage"));
        assert!(listing.contains("du -sh ~"));
    }
}
