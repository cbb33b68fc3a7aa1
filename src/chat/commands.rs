//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the API.

use crate::types::SessionId;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Create a new session, optionally bound to a specific model.
    New(Option<String>),

    /// List the account's sessions, grouped by day.
    Sessions,

    /// Open a session by id.
    Open(SessionId),

    /// Rename the current session.
    Name(String),

    /// Toggle the current session's pin flag.
    Pin,

    /// Delete a session by id (the current one when omitted).
    DeleteSession(Option<SessionId>),

    /// List the model catalog, grouped by family.
    Models,

    /// Rebind the current session to another model.
    Model(String),

    /// Stage a file attachment for the next message.
    Attach(String),

    /// List staged attachments.
    Attachments,

    /// Drop all staged attachments.
    ClearAttachments,

    /// Delete a chat record by id (the last assistant turn when omitted).
    Delete(Option<u64>),

    /// Replace the API token.
    Token(String),

    /// Toggle reasoning visibility.
    Thinking(bool),

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use achuan::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/open 42").is_some());
/// assert!(parse_command("Hello there!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "new" => ChatCommand::New(argument.map(|s| s.to_string())),
        "sessions" => ChatCommand::Sessions,
        "open" => match argument.map(str::parse::<SessionId>) {
            Some(Ok(id)) => ChatCommand::Open(id),
            Some(Err(_)) => ChatCommand::Invalid("/open requires a numeric session id".to_string()),
            None => ChatCommand::Invalid("/open requires a session id".to_string()),
        },
        "name" => match argument {
            Some(name) => ChatCommand::Name(name.to_string()),
            None => ChatCommand::Invalid("/name requires a session name".to_string()),
        },
        "pin" => ChatCommand::Pin,
        "delete-session" => match argument.map(str::parse::<SessionId>) {
            Some(Ok(id)) => ChatCommand::DeleteSession(Some(id)),
            Some(Err(_)) => {
                ChatCommand::Invalid("/delete-session requires a numeric session id".to_string())
            }
            None => ChatCommand::DeleteSession(None),
        },
        "models" => ChatCommand::Models,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "attach" => match argument {
            Some(path) => ChatCommand::Attach(path.to_string()),
            None => ChatCommand::Invalid("/attach requires a file path".to_string()),
        },
        "attachments" => ChatCommand::Attachments,
        "clear-attachments" => ChatCommand::ClearAttachments,
        "delete" => match argument.map(str::parse::<u64>) {
            Some(Ok(id)) => ChatCommand::Delete(Some(id)),
            Some(Err(_)) => {
                ChatCommand::Invalid("/delete requires a numeric record id".to_string())
            }
            None => ChatCommand::Delete(None),
        },
        "token" => match argument {
            Some(token) => ChatCommand::Token(token.to_string()),
            None => ChatCommand::Invalid("/token requires a token value".to_string()),
        },
        "thinking" => match argument {
            Some("on") => ChatCommand::Thinking(true),
            Some("off") => ChatCommand::Thinking(false),
            _ => ChatCommand::Invalid("/thinking requires 'on' or 'off'".to_string()),
        },
        "stats" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };

    Some(result)
}

/// Returns the help text describing all chat commands.
pub fn help_text() -> &'static str {
    "Available commands:
  /new [model]          Create a session (with the given model)
  /sessions             List sessions, grouped by day
  /open <id>            Open a session and load its history
  /name <name>          Rename the current session
  /pin                  Pin or unpin the current session
  /delete-session [id]  Delete a session (current one when omitted)
  /models               List available models, grouped by family
  /model <name>         Switch the current session to another model
  /attach <path>        Stage a file for the next message
  /attachments          List staged attachments
  /clear-attachments    Drop staged attachments
  /delete [record-id]   Delete a chat record (last reply when omitted)
  /token <token>        Replace the API token
  /thinking on|off      Show or hide reasoning output
  /stats                Show session statistics
  /help                 Show this help
  /quit                 Exit"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("Hello there"), None);
        assert_eq!(parse_command("  spaced message"), None);
    }

    #[test]
    fn quit_variants() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/QUIT"), Some(ChatCommand::Quit));
    }

    #[test]
    fn open_parses_id() {
        assert_eq!(parse_command("/open 42"), Some(ChatCommand::Open(42)));
        assert!(matches!(
            parse_command("/open forty-two"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/open"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn new_with_and_without_model() {
        assert_eq!(parse_command("/new"), Some(ChatCommand::New(None)));
        assert_eq!(
            parse_command("/new gpt-4o"),
            Some(ChatCommand::New(Some("gpt-4o".to_string())))
        );
    }

    #[test]
    fn delete_defaults_to_last_record() {
        assert_eq!(parse_command("/delete"), Some(ChatCommand::Delete(None)));
        assert_eq!(
            parse_command("/delete 31"),
            Some(ChatCommand::Delete(Some(31)))
        );
    }

    #[test]
    fn thinking_requires_on_or_off() {
        assert_eq!(
            parse_command("/thinking on"),
            Some(ChatCommand::Thinking(true))
        );
        assert_eq!(
            parse_command("/thinking off"),
            Some(ChatCommand::Thinking(false))
        );
        assert!(matches!(
            parse_command("/thinking maybe"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn name_keeps_inner_spaces() {
        assert_eq!(
            parse_command("/name rust questions, part 2"),
            Some(ChatCommand::Name("rust questions, part 2".to_string()))
        );
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert!(matches!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid(_))
        ));
    }
}
