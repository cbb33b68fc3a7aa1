use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Final statistics the service appends to a completion stream.
///
/// Arrives as the `type: "object"` frame once the answer has finished
/// streaming; it is the only place the record id for the new turn appears.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMetadata {
    /// Record id of the turn just completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Creation timestamp, as the service formats it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Completion timestamp, as the service formats it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    /// Tokens consumed by the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,

    /// Tokens produced by the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,

    /// Fields the client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_final_frame_payload() {
        let meta: TurnMetadata = serde_json::from_value(json!({
            "id": 88,
            "created": "2026-08-01 10:00:00",
            "updated": "2026-08-01 10:00:07",
            "completionTokens": 250,
            "taskId": "t-1"
        }))
        .unwrap();
        assert_eq!(meta.id, Some(88));
        assert_eq!(meta.completion_tokens, Some(250));
        assert_eq!(meta.extra.get("taskId"), Some(&json!("t-1")));
    }
}
