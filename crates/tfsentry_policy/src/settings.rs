//! Policy configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The two policy sources, independently optional and resolved by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySettings {
    /// Structured policy value embedded in the configuration.
    #[serde(default)]
    pub inline: Option<serde_json::Value>,
    /// Path to a policy source file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl PolicySettings {
    /// True when neither source is configured.
    pub fn is_empty(&self) -> bool {
        self.inline.is_none() && self.path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_deserialize_by_name() {
        let yaml_like = serde_json::json!({
            "inline": {"source": ["aws.s3"]},
            "path": "/policies/s3.json"
        });
        let settings: PolicySettings = serde_json::from_value(yaml_like).unwrap();
        assert!(settings.inline.is_some());
        assert_eq!(settings.path.as_deref(), Some("/policies/s3.json".as_ref()));
        assert!(!settings.is_empty());
    }

    #[test]
    fn test_empty_settings() {
        let settings: PolicySettings = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(settings.is_empty());
    }
}
