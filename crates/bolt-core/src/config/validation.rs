//! Config validation - warns about unknown fields

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Validate JSON config and warn about unknown fields.
pub fn warn_unknown_fields(content: &str, config_name: &str) {
    for path in unknown_fields(content) {
        warn!("Unknown config field in {config_name}: {path}");
    }
}

/// Paths like `"launcher.maxResult"` for every key the config does not know.
#[must_use]
pub fn unknown_fields(content: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return Vec::new();
    };
    find_unknown_keys(&value, &expected_config_keys(), "")
}

fn find_unknown_keys(value: &Value, expected: &ExpectedKeys, prefix: &str) -> Vec<String> {
    let mut unknowns = Vec::new();

    let Value::Object(obj) = value else {
        return unknowns;
    };

    for (key, child) in obj {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        if let Some(nested) = expected.nested.get(key.as_str()) {
            unknowns.extend(find_unknown_keys(child, nested, &path));
        } else if !expected.fields.contains(key.as_str()) {
            unknowns.push(path);
        }
    }

    unknowns
}

/// Expected keys for a config section.
struct ExpectedKeys {
    fields: HashSet<&'static str>,
    nested: HashMap<&'static str, ExpectedKeys>,
}

impl ExpectedKeys {
    fn new(fields: &[&'static str]) -> Self {
        Self {
            fields: fields.iter().copied().collect(),
            nested: HashMap::new(),
        }
    }

    fn with_nested(mut self, key: &'static str, nested: ExpectedKeys) -> Self {
        self.nested.insert(key, nested);
        self
    }
}

fn expected_config_keys() -> ExpectedKeys {
    ExpectedKeys::new(&["globalShortcut", "defaultMode"])
        .with_nested("launcher", ExpectedKeys::new(&["maxResults"]))
        .with_nested(
            "ai",
            ExpectedKeys::new(&["vertexApiKey", "openrouterApiKey"]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_fields_pass() {
        let content = r#"{
            "globalShortcut": "<Control>space",
            "launcher": { "maxResults": 5 },
            "ai": { "openrouterApiKey": "k" }
        }"#;
        assert!(unknown_fields(content).is_empty());
    }

    #[test]
    fn test_unknown_top_level_and_nested() {
        let content = r#"{ "theme": "dark", "launcher": { "maxResult": 5 } }"#;
        let mut unknowns = unknown_fields(content);
        unknowns.sort();
        assert_eq!(unknowns, vec!["launcher.maxResult", "theme"]);
    }

    #[test]
    fn test_invalid_json_reports_nothing() {
        assert!(unknown_fields("{ nope").is_empty());
    }
}
