//! Language-model agent client.
//!
//! The pipeline only needs `run(instructions, input) -> text`. The bundled
//! implementation talks to any OpenAI-compatible `/chat/completions`
//! endpoint. Calls have no timeout and cannot be cancelled; callers wait.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::AgentConfig;
use crate::{SDKError, SDKResult};

/// Instructions used when asking for a shell command.
pub const COMMAND_INSTRUCTIONS: &str = "You are a local assistant that receives natural language \
instructions and converts them into direct shell commands for a Linux desktop. Reply with only \
the raw shell command on a single line, without explanation or code fences. If the request is not \
something a shell command can do, answer briefly in plain text.";

/// Instructions used when summarizing a call transcript.
pub const SUMMARY_INSTRUCTIONS: &str = "Summarize this call transcript in a few sentences. If the \
caller agreed to do something later, add a final sentence starting with \"Follow up:\" that states \
the task.";

/// Anything that can turn instructions plus input into text.
#[async_trait]
pub trait LanguageModelAgent: Send + Sync {
    async fn run(&self, instructions: &str, input: &str) -> SDKResult<String>;
}

/// Client for an OpenAI-compatible chat completions API.
pub struct OpenAiAgent {
    client: Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiAgent {
    pub fn new(api_base: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Build from config, reading the key from `config.api_key_env`.
    pub fn from_config(config: &AgentConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());
        Self::new(&config.api_base, &config.model, api_key)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body(&self, instructions: &str, input: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": instructions },
                { "role": "user", "content": input },
            ],
        })
    }
}

/// Pull `choices[0].message.content` out of a chat completions response.
fn extract_content(data: &Value) -> SDKResult<String> {
    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| SDKError::agent("response has no message content"))
}

#[async_trait]
impl LanguageModelAgent for OpenAiAgent {
    async fn run(&self, instructions: &str, input: &str) -> SDKResult<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.request_body(instructions, input));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("Calling {} with model {}", url, self.model);
        let response = request.send().await.map_err(|e| {
            warn!("HTTP request to agent failed (base={}): {}", self.api_base, e);
            SDKError::agent(format!("request failed: {}", e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SDKError::agent(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!("Agent API returned status {}: {}", status, text);
            return Err(SDKError::agent(format!("HTTP {}: {}", status, text.trim())));
        }

        let data: Value = serde_json::from_str(&text)?;
        extract_content(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content() {
        let data = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  ls -lah\n" } }]
        });
        assert_eq!(extract_content(&data).unwrap(), "ls -lah");

        let err = extract_content(&json!({ "choices": [] })).unwrap_err();
        assert!(err.is_agent());
    }

    #[test]
    fn test_request_body() {
        let agent = OpenAiAgent::new("http://localhost:8080/v1/", "local", None);
        assert_eq!(agent.api_base, "http://localhost:8080/v1");
        assert!(!agent.has_api_key());

        let body = agent.request_body("be terse", "list files");
        assert_eq!(body["model"], "local");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "list files");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_agent_error() {
        // Port 9 (discard) on localhost is not an HTTP server
        let agent = OpenAiAgent::new("http://127.0.0.1:9", "m", None);
        let err = agent.run("i", "x").await.unwrap_err();
        assert!(err.is_agent());
    }
}
