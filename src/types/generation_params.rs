use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generation parameters sent with session creation, session updates, and
/// completion requests.
///
/// The service keys these camelCase; the same block is echoed into every
/// request that accepts them so the server never falls back to a stale copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// How many prior turns the server feeds back into the model.
    pub context_count: u32,

    /// Frequency penalty.
    pub frequency_penalty: f64,

    /// Maximum tokens per response; zero lets the server choose.
    pub max_token: u32,

    /// Presence penalty.
    pub presence_penalty: f64,

    /// System prompt applied to the session.
    pub prompt: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Pin flag; 1 pins the session to the top of the list.
    pub top_sort: i64,
}

impl GenerationParams {
    /// Creates parameters with the service defaults.
    pub fn new() -> Self {
        Self {
            context_count: 25,
            frequency_penalty: 0.0,
            max_token: 0,
            presence_penalty: 0.0,
            prompt: String::new(),
            temperature: 0.0,
            top_sort: 0,
        }
    }

    /// Sets the context count.
    pub fn with_context_count(mut self, context_count: u32) -> Self {
        self.context_count = context_count;
        self
    }

    /// Sets the system prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_token(mut self, max_token: u32) -> Self {
        self.max_token = max_token;
        self
    }

    /// The parameter fields that session updates force back to the client's
    /// configured values, overriding whatever the server record holds.
    ///
    /// `topSort` is deliberately absent: the pin flag belongs to the server
    /// record and only changes through an explicit update.
    pub fn sync_entries(&self) -> Map<String, Value> {
        let mut entries = Map::new();
        entries.insert("contextCount".to_string(), Value::from(self.context_count));
        entries.insert(
            "frequencyPenalty".to_string(),
            Value::from(self.frequency_penalty),
        );
        entries.insert("maxToken".to_string(), Value::from(self.max_token));
        entries.insert(
            "presencePenalty".to_string(),
            Value::from(self.presence_penalty),
        );
        entries.insert("prompt".to_string(), Value::from(self.prompt.clone()));
        entries.insert("temperature".to_string(), Value::from(self.temperature));
        entries
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn serializes_camel_case() {
        let params = GenerationParams::new().with_temperature(0.5);
        let json = to_value(params).unwrap();
        assert_eq!(
            json,
            json!({
                "contextCount": 25,
                "frequencyPenalty": 0.0,
                "maxToken": 0,
                "presencePenalty": 0.0,
                "prompt": "",
                "temperature": 0.5,
                "topSort": 0
            })
        );
    }

    #[test]
    fn sync_entries_exclude_pin_flag() {
        let entries = GenerationParams::new().sync_entries();
        assert!(entries.contains_key("contextCount"));
        assert!(!entries.contains_key("topSort"));
    }
}
