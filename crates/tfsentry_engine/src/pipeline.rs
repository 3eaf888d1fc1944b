//! End-to-end pipeline: sources to verdict.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use tfsentry_events::{EventFormat, SyntheticEvent, SynthesizerRegistry};
use tfsentry_exec::{CliToolRunner, NameSeq, ToolRunner};
use tfsentry_frontend::{FrontendRegistry, Language};
use tfsentry_policy::{PolicyCompiler, PolicySettings, RuleDocument};

use crate::error::EngineResult;
use crate::validator::{EvaluatorConfig, Validator};
use crate::verdict::Verdict;

/// Configuration for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source language of the configuration under validation.
    pub language: Language,
    /// Target event format.
    pub format: EventFormat,
    /// Policy sources.
    pub policy: PolicySettings,
    /// Rule compiler executable.
    pub rule_compiler: String,
    /// Evaluator settings.
    pub evaluator: EvaluatorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: Language::Terraform,
            format: EventFormat::CloudTrail,
            policy: PolicySettings::default(),
            rule_compiler: "rule2rego".to_string(),
            evaluator: EvaluatorConfig::default(),
        }
    }
}

/// Wires discovery, front end, synthesizer, policy compiler, and
/// validator into the single entry point the caller uses.
pub struct Pipeline {
    frontends: FrontendRegistry,
    synthesizers: SynthesizerRegistry,
    runner: Arc<dyn ToolRunner>,
    names: NameSeq,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            frontends: FrontendRegistry::with_defaults(),
            synthesizers: SynthesizerRegistry::with_defaults(),
            runner: Arc::new(CliToolRunner::new()),
            names: NameSeq::new(),
            config,
        }
    }

    /// Substitute the tool runner, e.g. a mock in tests.
    pub fn with_runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Compile the sources under `root` and synthesize their events.
    /// The graph is discarded once the events exist.
    pub fn synthesize(&self, root: &Path) -> EngineResult<Vec<SyntheticEvent>> {
        let graph = self.frontends.compile(self.config.language, root)?;
        if !graph.unresolved().is_empty() {
            warn!(
                unresolved = graph.unresolved().len(),
                "graph has unresolved references, their values are unknown"
            );
        }
        let events = self.synthesizers.synthesize(self.config.format, &graph)?;
        Ok(events)
    }

    /// Compile the configured policy sources into rule documents.
    pub async fn compile_policy(&self) -> Vec<RuleDocument> {
        PolicyCompiler::new(Arc::clone(&self.runner))
            .with_program(&self.config.rule_compiler)
            .with_names(self.names.clone())
            .compile_all(&self.config.policy)
            .await
    }

    /// Run the whole pipeline for `root` and produce the verdict.
    pub async fn validate(&self, root: &Path) -> EngineResult<Verdict> {
        info!(root = %root.display(), "validating configuration");

        let rules = self.compile_policy().await;
        let events = self.synthesize(root)?;

        let verdict = Validator::new(Arc::clone(&self.runner))
            .with_config(self.config.evaluator.clone())
            .with_names(self.names.clone())
            .validate(&rules, &events)
            .await?;

        info!(
            valid = verdict.valid,
            evaluations = verdict.evaluations,
            "validation complete"
        );
        Ok(verdict)
    }
}
