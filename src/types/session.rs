use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque identifier for a server-side session.
pub type SessionId = u64;

/// A server-side conversation context.
///
/// The record is owned entirely by the remote API; the client only ever reads
/// a handful of fields and echoes the rest back verbatim when updating. Any
/// field this struct does not know about lands in `extra` and survives the
/// round trip, so the client stays compatible with server-side additions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The model the session is bound to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Creation timestamp, as the service formats it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last-update timestamp, as the service formats it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    /// Pin flag; 1 keeps the session at the top of the list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_sort: Option<i64>,

    /// Fields the client does not interpret, preserved for echo-back.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Display name, falling back when the server left it unset.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed session)")
    }

    /// Returns true if the session is pinned.
    pub fn is_pinned(&self) -> bool {
        self.top_sort == Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_round_trip() {
        let wire = json!({
            "id": 42,
            "name": "notes",
            "model": "gemini-3-pro-preview",
            "created": "2026-08-01 09:15:00",
            "topSort": 1,
            "useAppId": 0,
            "icon": ""
        });
        let session: Session = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(session.id, 42);
        assert!(session.is_pinned());
        assert_eq!(session.extra.get("useAppId"), Some(&json!(0)));

        let back = serde_json::to_value(&session).unwrap();
        assert_eq!(back, wire);
    }

    #[test]
    fn display_name_fallback() {
        let session: Session = serde_json::from_value(json!({"id": 7})).unwrap();
        assert_eq!(session.display_name(), "(unnamed session)");
        assert!(!session.is_pinned());
    }
}
