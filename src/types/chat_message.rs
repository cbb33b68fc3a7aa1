use serde::{Deserialize, Serialize};

use crate::types::{AttachmentRef, ChatRecord};

/// Role of a conversation message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// One entry in the local conversation log.
///
/// Messages are appended as turns complete and never edited afterwards; the
/// only exception is the in-flight assistant placeholder that grows while a
/// completion streams. Assistant messages keep the identifiers needed to
/// delete the turn server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who said it.
    pub role: MessageRole,

    /// Raw text, reasoning markers included for assistant messages.
    pub content: String,

    /// Token count the service attributed to this side of the turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,

    /// Timestamp the service attached, as formatted on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    /// Model that produced the message, for assistant messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Files the user attached to this turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<AttachmentRef>,

    /// Record id, needed to delete the turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<u64>,

    /// Session id, needed to delete the turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,

    /// Task id the delete endpoint wants echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tokens: None,
            updated: None,
            model: None,
            files: Vec::new(),
            record_id: None,
            session_id: None,
            task_id: None,
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            ..Self::user(content)
        }
    }

    /// Attaches file references to the message.
    pub fn with_files(mut self, files: Vec<AttachmentRef>) -> Self {
        self.files = files;
        self
    }

    /// Sets the token count.
    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Expands a stored record into its user and assistant messages, in
    /// conversation order.
    pub fn from_record(record: &ChatRecord) -> Vec<Self> {
        let mut messages = Vec::new();
        if let Some(user_text) = &record.user_text {
            messages.push(Self {
                role: MessageRole::User,
                content: user_text.clone(),
                tokens: record.prompt_tokens,
                updated: record.created.clone(),
                model: record.model.clone(),
                files: record.files().to_vec(),
                record_id: None,
                session_id: None,
                task_id: None,
            });
        }
        if let Some(ai_text) = &record.ai_text {
            messages.push(Self {
                role: MessageRole::Assistant,
                content: ai_text.clone(),
                tokens: record.completion_tokens,
                updated: record.updated.clone(),
                model: record.model.clone(),
                files: Vec::new(),
                record_id: Some(record.id),
                session_id: record.session_id,
                task_id: record.task_id.clone(),
            });
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_expands_in_conversation_order() {
        let record: ChatRecord = serde_json::from_value(json!({
            "id": 31,
            "sessionId": 5,
            "userText": "ping",
            "aiText": "pong",
            "promptTokens": 3,
            "completionTokens": 4
        }))
        .unwrap();

        let messages = ChatMessage::from_record(&record);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].tokens, Some(3));
        assert!(messages[0].record_id.is_none());
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].record_id, Some(31));
        assert_eq!(messages[1].session_id, Some(5));
    }

    #[test]
    fn one_sided_record_yields_one_message() {
        let record: ChatRecord =
            serde_json::from_value(json!({"id": 1, "aiText": "orphan reply"})).unwrap();
        let messages = ChatMessage::from_record(&record);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::Assistant);
    }
}
