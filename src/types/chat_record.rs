use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::AttachmentRef;

/// One stored conversation turn: the user's text and the assistant's reply,
/// as the history endpoint returns them (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    /// Record identifier, used when deleting the turn.
    pub id: u64,

    /// Owning session, when the service includes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,

    /// Task identifier the delete endpoint wants echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// The user's side of the turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_text: Option<String>,

    /// The assistant's side of the turn, raw (reasoning markers included).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_text: Option<String>,

    /// Files attached to the turn. The service sends `null` for none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_files: Option<Vec<AttachmentRef>>,

    /// Prompt-side token count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,

    /// Completion-side token count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,

    /// Creation timestamp, as the service formats it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last-update timestamp, as the service formats it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    /// Model that produced the reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Fields the client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatRecord {
    /// Attached files, normalizing the service's `null` to an empty list.
    pub fn files(&self) -> &[AttachmentRef] {
        self.use_files.as_deref().unwrap_or(&[])
    }
}

/// One page of chat records for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
    /// The records on this page, newest first.
    #[serde(default)]
    pub records: Vec<ChatRecord>,

    /// Paging metadata the client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_use_files_normalizes_to_empty() {
        let record: ChatRecord = serde_json::from_value(json!({
            "id": 9,
            "userText": "hi",
            "aiText": "hello",
            "useFiles": null,
            "completionTokens": 12
        }))
        .unwrap();
        assert!(record.files().is_empty());
        assert_eq!(record.completion_tokens, Some(12));
    }

    #[test]
    fn page_without_records_field() {
        let page: RecordPage = serde_json::from_value(json!({"total": 0})).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.extra.get("total"), Some(&json!(0)));
    }
}
