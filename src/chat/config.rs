//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_MODEL;
use crate::types::GenerationParams;

/// Command-line arguments for the achuan-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// API token; falls back to the ACHUAN_TOKEN environment variable.
    #[arrrg(optional, "API token (default: ACHUAN_TOKEN env var)", "TOKEN")]
    pub token: Option<String>,

    /// Base URL of the service.
    #[arrrg(optional, "Service base URL", "URL")]
    pub base_url: Option<String>,

    /// Model for newly created sessions.
    #[arrrg(optional, "Model for new sessions (default: gemini-3-pro-preview)", "MODEL")]
    pub model: Option<String>,

    /// System prompt applied to sessions.
    #[arrrg(optional, "System prompt for sessions", "PROMPT")]
    pub prompt: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Hide reasoning output while streaming.
    #[arrrg(flag, "Hide reasoning output")]
    pub no_thinking: bool,
}

/// Configuration for the chat application.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API token; `None` defers to the environment.
    pub token: Option<String>,

    /// Base URL override; `None` uses the service default.
    pub base_url: Option<String>,

    /// Model used when creating sessions.
    pub model: String,

    /// Generation parameters sent with every request.
    pub params: GenerationParams,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether reasoning output is shown while streaming.
    pub show_thinking: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-3-pro-preview
    /// - Color: enabled
    /// - Reasoning output: shown
    pub fn new() -> Self {
        Self {
            token: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            params: GenerationParams::new(),
            use_color: true,
            show_thinking: true,
        }
    }

    /// Sets the API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the model used for new sessions.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the generation parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Hides reasoning output.
    pub fn without_thinking(mut self) -> Self {
        self.show_thinking = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let mut params = GenerationParams::new();
        if let Some(prompt) = args.prompt {
            params.prompt = prompt;
        }
        ChatConfig {
            token: args.token,
            base_url: args.base_url,
            model: args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            params,
            use_color: !args.no_color,
            show_thinking: !args.no_thinking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.token.is_none());
        assert!(config.base_url.is_none());
        assert!(config.use_color);
        assert!(config.show_thinking);
        assert_eq!(config.params, GenerationParams::new());
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.use_color);
        assert!(config.show_thinking);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            token: Some("tok".to_string()),
            base_url: Some("https://example.com/api".to_string()),
            model: Some("deepseek-r1".to_string()),
            prompt: Some("Answer briefly.".to_string()),
            no_color: true,
            no_thinking: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.base_url.as_deref(), Some("https://example.com/api"));
        assert_eq!(config.model, "deepseek-r1");
        assert_eq!(config.params.prompt, "Answer briefly.");
        assert!(!config.use_color);
        assert!(!config.show_thinking);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_token("tok")
            .with_model("glm-5")
            .without_color()
            .without_thinking();
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.model, "glm-5");
        assert!(!config.use_color);
        assert!(!config.show_thinking);
    }
}
