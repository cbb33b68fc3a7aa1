use serde_json::{Map, Value};

/// A partial edit to a session record.
///
/// Only the fields the caller actually sets are written over the echoed
/// server record; everything else keeps the server's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    /// New display name.
    pub name: Option<String>,

    /// New model binding.
    pub model: Option<String>,

    /// New pin flag (1 = pinned, 0 = unpinned).
    pub top_sort: Option<i64>,
}

impl SessionUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the session.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Rebinds the session to another model.
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Sets the pin flag.
    pub fn pinned(pinned: bool) -> Self {
        Self {
            top_sort: Some(if pinned { 1 } else { 0 }),
            ..Self::default()
        }
    }

    /// Writes the set fields into a wire payload.
    pub fn apply_to(&self, payload: &mut Map<String, Value>) {
        if let Some(name) = &self.name {
            payload.insert("name".to_string(), Value::from(name.clone()));
        }
        if let Some(model) = &self.model {
            payload.insert("model".to_string(), Value::from(model.clone()));
        }
        if let Some(top_sort) = self.top_sort {
            payload.insert("topSort".to_string(), Value::from(top_sort));
        }
    }

    /// Returns true if the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.model.is_none() && self.top_sort.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn apply_overwrites_only_set_fields() {
        let mut payload = Map::new();
        payload.insert("name".to_string(), json!("old"));
        payload.insert("model".to_string(), json!("gpt-4o"));

        SessionUpdate::rename("new").apply_to(&mut payload);
        assert_eq!(payload.get("name"), Some(&json!("new")));
        assert_eq!(payload.get("model"), Some(&json!("gpt-4o")));
    }

    #[test]
    fn pin_flag_round_trip() {
        let mut payload = Map::new();
        SessionUpdate::pinned(true).apply_to(&mut payload);
        assert_eq!(payload.get("topSort"), Some(&json!(1)));
        SessionUpdate::pinned(false).apply_to(&mut payload);
        assert_eq!(payload.get("topSort"), Some(&json!(0)));
    }

    #[test]
    fn empty_update() {
        assert!(SessionUpdate::new().is_empty());
        assert!(!SessionUpdate::model("m").is_empty());
    }
}
