//! Shell-likeness detection for free-text agent replies.

use super::is_background;
use serde::{Deserialize, Serialize};

fn default_leading_tokens() -> Vec<String> {
    [
        "sudo", "ls", "mkdir", "mv", "cp", "cat", "echo", "touch", "du", "df", "find", "grep",
        "git", "curl", "wget", "notify-send", "xdg-open", "code", "python3", "chmod", "tar",
        "rm",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Decides whether agent output is a command worth running.
///
/// A reply qualifies when its first whitespace-separated token is on the
/// allow-list, or when it ends with the background marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoExecPolicy {
    #[serde(default = "default_leading_tokens")]
    pub leading_tokens: Vec<String>,
    #[serde(default = "default_true")]
    pub allow_background: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AutoExecPolicy {
    fn default() -> Self {
        Self {
            leading_tokens: default_leading_tokens(),
            allow_background: true,
        }
    }
}

impl AutoExecPolicy {
    /// Return the command to run, or `None` if `reply` reads as prose.
    ///
    /// A single fenced code block is unwrapped first.
    pub fn extract_command(&self, reply: &str) -> Option<String> {
        let candidate = strip_code_fence(reply.trim());
        if candidate.is_empty() || candidate.lines().count() > 1 {
            return None;
        }

        let first = candidate.split_whitespace().next()?;
        let allowed = self.leading_tokens.iter().any(|t| t == first);
        if allowed || (self.allow_background && is_background(candidate)) {
            Some(candidate.to_string())
        } else {
            None
        }
    }

    pub fn looks_like_command(&self, reply: &str) -> bool {
        self.extract_command(reply).is_some()
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = body.strip_suffix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening line
    match body.split_once('\n') {
        Some((lang, rest)) if !lang.contains(' ') => rest.trim(),
        _ => body.trim(),
    }
}
