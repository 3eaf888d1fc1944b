//! Configuration file loading.
//!
//! Settings are resolved by name from `tfsentry.yaml` (or the file named
//! with `--config`); every section is optional and falls back to its
//! default.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tfsentry_engine::{EvaluatorConfig, PipelineConfig};
use tfsentry_events::EventFormat;
use tfsentry_frontend::Language;
use tfsentry_policy::PolicySettings;

const DEFAULT_CONFIG_FILE: &str = "tfsentry.yaml";

/// Top-level configuration schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source language tag of the configuration under validation.
    pub language: String,
    /// Target event format tag.
    pub format: String,
    /// Policy sources.
    pub policy: PolicySettings,
    /// External tool executables.
    pub tools: ToolsConfig,
    /// Evaluator settings.
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "hcl".to_string(),
            format: "cloudtrail".to_string(),
            policy: PolicySettings::default(),
            tools: ToolsConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Paths to the external executables. Injected here so the pipeline has
/// no fixed filesystem layout baked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub rule_compiler: String,
    pub opa: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            rule_compiler: "rule2rego".to_string(),
            opa: "opa".to_string(),
        }
    }
}

/// Evaluator tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Query whose boolean value is the per-pair verdict.
    pub query: String,
    /// Concurrent evaluator processes.
    pub max_workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            query: "data.rule2rego.allow".to_string(),
            max_workers: 8,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist; without one, `tfsentry.yaml` in the
    /// working directory is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::read(default)
                } else {
                    debug!("no configuration file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("configuration file not found: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid configuration: {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the tag fields and build the pipeline configuration.
    pub fn pipeline(&self) -> anyhow::Result<PipelineConfig> {
        let language = Language::from_tag(&self.language)
            .with_context(|| format!("unsupported language: {}", self.language))?;
        let format = EventFormat::from_tag(&self.format)
            .with_context(|| format!("unsupported event format: {}", self.format))?;

        Ok(PipelineConfig {
            language,
            format,
            policy: self.policy.clone(),
            rule_compiler: self.tools.rule_compiler.clone(),
            evaluator: EvaluatorConfig::default()
                .with_program(&self.tools.opa)
                .with_query(&self.engine.query)
                .workers(self.engine.max_workers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.language, "hcl");
        assert_eq!(config.tools.opa, "opa");
        assert!(config.policy.is_empty());
        assert!(config.pipeline().is_ok());
    }

    #[test]
    fn test_load_named_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tfsentry.yaml");
        fs::write(
            &path,
            r#"
policy:
  inline:
    source: ["aws.s3"]
  path: policies/s3.json
tools:
  opa: /usr/local/bin/opa
engine:
  max_workers: 2
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.policy.inline.is_some());
        assert_eq!(
            config.policy.path.as_deref(),
            Some(Path::new("policies/s3.json"))
        );
        assert_eq!(config.tools.opa, "/usr/local/bin/opa");
        assert_eq!(config.engine.max_workers, 2);
        // Unset sections keep their defaults.
        assert_eq!(config.tools.rule_compiler, "rule2rego");
        assert_eq!(config.engine.query, "data.rule2rego.allow");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = Config::load(Some(Path::new("/no/such/tfsentry.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_language_tag_is_rejected() {
        let config = Config {
            language: "pulumi".to_string(),
            ..Config::default()
        };
        assert!(config.pipeline().is_err());
    }
}
