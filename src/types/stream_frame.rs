use serde::{Deserialize, Serialize};

use crate::types::TurnMetadata;

/// One decoded record from the completion event stream.
///
/// The wire shape is `{"type": ..., "data": ...}` inside a `data:` SSE line.
/// Frames are consumed as they arrive and never retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum StreamFrame {
    /// An incremental text delta of the assistant's reply.
    String(String),

    /// The final metadata frame (record id, timestamps, token counts).
    Object(TurnMetadata),

    /// Legacy token-count frame some deployments still emit.
    Stats(StatsFrame),
}

/// Payload of the legacy `stats` frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsFrame {
    /// Total tokens for the turn.
    #[serde(default)]
    pub total_token: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_frame() {
        let frame: StreamFrame =
            serde_json::from_value(json!({"type": "string", "data": "hel"})).unwrap();
        assert!(matches!(frame, StreamFrame::String(ref s) if s == "hel"));
    }

    #[test]
    fn final_metadata_frame() {
        let frame: StreamFrame = serde_json::from_value(json!({
            "type": "object",
            "data": {"id": 3, "completionTokens": 9}
        }))
        .unwrap();
        match frame {
            StreamFrame::Object(meta) => {
                assert_eq!(meta.id, Some(3));
                assert_eq!(meta.completion_tokens, Some(9));
            }
            other => panic!("expected object frame, got {other:?}"),
        }
    }

    #[test]
    fn stats_frame() {
        let frame: StreamFrame =
            serde_json::from_value(json!({"type": "stats", "data": {"totalToken": 42}})).unwrap();
        assert!(matches!(frame, StreamFrame::Stats(ref s) if s.total_token == 42));
    }

    #[test]
    fn unknown_tag_is_a_parse_error() {
        let result: Result<StreamFrame, _> =
            serde_json::from_value(json!({"type": "mystery", "data": {}}));
        assert!(result.is_err());
    }
}
