//! One-shot prompt running against the chat service.
//!
//! This module backs the `achuan-prompt` binary: a prompt (plain text or a
//! YAML run configuration) is sent through a throwaway session and the
//! streamed reply is collected, split into answer and reasoning, and
//! returned with timing and token usage.

use std::path::Path;
use std::time::{Duration, Instant};

use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::client::{Achuan, DEFAULT_MODEL};
use crate::error::{Error, Result};
use crate::thinking::split_thinking;
use crate::types::FileAttachment;

/// Configuration for a one-shot prompt run.
///
/// Loadable from YAML:
///
/// ```yaml
/// name: "capital check"
/// model: "gemini-3-pro-preview"
/// prompt: "What is the capital of France?"
/// files:
///   - ./context.txt
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRunConfig {
    /// Name of the run (optional, used in output).
    pub name: Option<String>,

    /// Model for the throwaway session.
    pub model: Option<String>,

    /// The prompt text to send.
    pub prompt: String,

    /// Paths of files to attach.
    pub files: Option<Vec<String>>,
}

impl PromptRunConfig {
    /// Creates a configuration from prompt text.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Sets the run name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Loads a YAML run configuration from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        serde_yaml::from_str(&text).map_err(|err| {
            Error::serialization(
                format!("failed to parse {}: {err}", path.display()),
                Some(Box::new(err)),
            )
        })
    }

    /// Runs the prompt through a fresh session.
    ///
    /// The reply is streamed to completion before returning; a failure at
    /// any point (session creation, transport, a mid-stream error) aborts
    /// the run.
    pub async fn run(&self, client: &Achuan) -> Result<PromptRunResult> {
        let mut client = client.clone();
        let model = self.model.as_deref().unwrap_or(DEFAULT_MODEL);

        let mut attachments = Vec::new();
        for path in self.files.as_deref().unwrap_or(&[]) {
            attachments.push(FileAttachment::from_path(path)?);
        }

        let start = Instant::now();
        client.create_session(model).await?;

        let mut stream = client.stream_completion(&self.prompt, attachments).await;
        let mut raw = String::new();
        while let Some(item) = stream.next().await {
            raw.push_str(&item?);
        }

        let split = split_thinking(&raw);
        Ok(PromptRunResult {
            config: self.clone(),
            answer: split.answer.trim().to_string(),
            thinking: split.thinking,
            duration: start.elapsed(),
            tokens_used: stream.tokens_used(),
        })
    }
}

/// Result of running a one-shot prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRunResult {
    /// The configuration that was run.
    pub config: PromptRunConfig,

    /// The answer text, reasoning spans removed.
    pub answer: String,

    /// The reasoning text, when the model produced any.
    pub thinking: Option<String>,

    /// Wall-clock duration of the run.
    pub duration: Duration,

    /// Completion tokens the service reported.
    pub tokens_used: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_round_trip() {
        let yaml = "name: greeting\nmodel: glm-5\nprompt: say hi\nfiles:\n  - a.txt\n";
        let config: PromptRunConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("greeting"));
        assert_eq!(config.model.as_deref(), Some("glm-5"));
        assert_eq!(config.prompt, "say hi");
        assert_eq!(config.files.as_deref(), Some(&["a.txt".to_string()][..]));
    }

    #[test]
    fn builder_defaults() {
        let config = PromptRunConfig::new("hello").with_name("n");
        assert_eq!(config.prompt, "hello");
        assert_eq!(config.name.as_deref(), Some("n"));
        assert!(config.model.is_none());
        assert!(config.files.is_none());
    }

    #[tokio::test]
    async fn run_without_token_fails() {
        let client = Achuan::new(Some(String::new())).unwrap();
        let err = PromptRunConfig::new("hi").run(&client).await.unwrap_err();
        assert!(err.is_authentication());
    }
}
