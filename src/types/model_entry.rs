use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model families the picker groups the catalog into, matched in order,
/// case-insensitively, against each model identifier.
pub const MODEL_FAMILIES: [&str; 8] = [
    "GPT", "GEMINI", "CLAUDE", "DEEPSEEK", "SORA", "GLM", "QWEN3", "DOUBAO",
];

/// Bucket for models that match no family.
pub const OTHER_FAMILY: &str = "Other";

/// One selectable model from the service's template catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    /// The model identifier sent back on session creation and updates.
    #[serde(default)]
    pub value: String,

    /// Catalog fields the client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `data` payload of the template catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    /// All selectable models.
    #[serde(default)]
    pub models: Vec<ModelEntry>,

    /// Catalog fields the client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelCatalog {
    /// Model identifiers, skipping entries the service left blank.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.models
            .iter()
            .map(|entry| entry.value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Groups the catalog into the fixed families, in family order, with
    /// unmatched models collected under [`OTHER_FAMILY`]. Empty families are
    /// dropped.
    pub fn by_family(&self) -> Vec<(&'static str, Vec<&str>)> {
        let mut grouped: Vec<(&'static str, Vec<&str>)> = MODEL_FAMILIES
            .iter()
            .map(|family| (*family, Vec::new()))
            .collect();
        let mut other: Vec<&str> = Vec::new();

        for value in self.values() {
            let lower = value.to_lowercase();
            match MODEL_FAMILIES
                .iter()
                .position(|family| lower.contains(&family.to_lowercase()))
            {
                Some(idx) => grouped[idx].1.push(value),
                None => other.push(value),
            }
        }

        grouped.retain(|(_, models)| !models.is_empty());
        if !other.is_empty() {
            grouped.push((OTHER_FAMILY, other));
        }
        grouped
    }

    /// The family a given model belongs to.
    pub fn family_of(model: &str) -> &'static str {
        let lower = model.to_lowercase();
        MODEL_FAMILIES
            .iter()
            .find(|family| lower.contains(&family.to_lowercase()))
            .copied()
            .unwrap_or(OTHER_FAMILY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(values: &[&str]) -> ModelCatalog {
        serde_json::from_value(json!({
            "models": values.iter().map(|v| json!({"value": v})).collect::<Vec<_>>()
        }))
        .unwrap()
    }

    #[test]
    fn groups_case_insensitively_in_family_order() {
        let catalog = catalog(&["gpt-4o", "Gemini-3-Pro-Preview", "mystery-1"]);
        let grouped = catalog.by_family();
        assert_eq!(grouped[0], ("GPT", vec!["gpt-4o"]));
        assert_eq!(grouped[1], ("GEMINI", vec!["Gemini-3-Pro-Preview"]));
        assert_eq!(grouped[2], (OTHER_FAMILY, vec!["mystery-1"]));
    }

    #[test]
    fn first_matching_family_wins() {
        // "gpt" appears before "claude" in the family order.
        assert_eq!(ModelCatalog::family_of("claude-gpt-mix"), "GPT");
    }

    #[test]
    fn blank_values_are_skipped() {
        let catalog = catalog(&["", "deepseek-r1"]);
        let grouped = catalog.by_family();
        assert_eq!(grouped, vec![("DEEPSEEK", vec!["deepseek-r1"])]);
    }
}
