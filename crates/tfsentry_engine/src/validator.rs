//! Rule-by-event validation through the external evaluator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use tfsentry_events::SyntheticEvent;
use tfsentry_exec::{ExecutionResult, NameSeq, ToolInvocation, ToolRunner};
use tfsentry_policy::RuleDocument;

use crate::error::{EngineError, EngineResult};
use crate::verdict::Verdict;

/// Configuration for the external evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Evaluator executable.
    pub program: String,
    /// Query whose boolean value is the per-pair verdict.
    pub query: String,
    /// Concurrent evaluator processes.
    pub max_workers: usize,
    /// Per-evaluation timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            program: "opa".to_string(),
            query: "data.rule2rego.allow".to_string(),
            max_workers: 8,
            timeout_seconds: 60,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }
}

/// Evaluates every rule against every event and ANDs the results.
pub struct Validator {
    runner: Arc<dyn ToolRunner>,
    config: EvaluatorConfig,
    names: NameSeq,
}

impl Validator {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            config: EvaluatorConfig::default(),
            names: NameSeq::new(),
        }
    }

    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_names(mut self, names: NameSeq) -> Self {
        self.names = names;
        self
    }

    /// Validate the events against the rules.
    ///
    /// The verdict is the AND over the full rule-by-event cross product;
    /// an empty cross product is vacuously valid. Pair evaluation order
    /// is unspecified. Any single evaluator failure fails the whole
    /// call, since a missing verdict cannot be treated as pass or fail.
    pub async fn validate(
        &self,
        rules: &[RuleDocument],
        events: &[SyntheticEvent],
    ) -> EngineResult<Verdict> {
        if rules.is_empty() || events.is_empty() {
            info!(
                rules = rules.len(),
                events = events.len(),
                "nothing to evaluate, vacuously valid"
            );
            return Ok(Verdict::vacuous(rules.len(), events.len()));
        }

        // One scoped directory for the whole call: created first,
        // removed last, on success and failure alike.
        let dir = tempfile::Builder::new()
            .prefix("tfsentry-validate-")
            .tempdir()?;
        let result = self.validate_in(dir.path(), rules, events).await;
        if let Err(e) = dir.close() {
            warn!("failed to remove validation temp dir: {e}");
        }
        result
    }

    async fn validate_in(
        &self,
        root: &Path,
        rules: &[RuleDocument],
        events: &[SyntheticEvent],
    ) -> EngineResult<Verdict> {
        let mut rule_paths = Vec::with_capacity(rules.len());
        for rule in rules {
            let path = root.join(self.names.next("rule", "rego"));
            tokio::fs::write(&path, &rule.body).await?;
            rule_paths.push(path);
        }

        let mut event_paths = Vec::with_capacity(events.len());
        for event in events {
            let path = root.join(self.names.next("event", "json"));
            tokio::fs::write(&path, event.to_json()?).await?;
            event_paths.push(path);
        }

        debug!(
            rules = rule_paths.len(),
            events = event_paths.len(),
            "evaluating rule/event cross product"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut pairs: JoinSet<EngineResult<bool>> = JoinSet::new();
        for rule_path in &rule_paths {
            for event_path in &event_paths {
                let invocation = self.evaluation(rule_path, event_path);
                let runner = Arc::clone(&self.runner);
                let semaphore = Arc::clone(&semaphore);
                pairs.spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| EngineError::Evaluation("worker pool closed".to_string()))?;
                    let result = runner.run(&invocation).await?;
                    parse_verdict(&result)
                });
            }
        }

        // Dropping the set on an early return aborts outstanding tasks;
        // their child processes die with them (kill_on_drop).
        let mut valid = true;
        while let Some(joined) = pairs.join_next().await {
            let permitted = joined
                .map_err(|e| EngineError::Evaluation(format!("evaluation task failed: {e}")))??;
            valid &= permitted;
        }

        Ok(Verdict {
            valid,
            rules: rules.len(),
            events: events.len(),
            evaluations: rules.len() * events.len(),
        })
    }

    fn evaluation(&self, rule_path: &Path, event_path: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.config.program)
            .args(["eval", "--format", "json"])
            .arg("--input")
            .arg(event_path.display().to_string())
            .arg("--data")
            .arg(rule_path.display().to_string())
            .arg(&self.config.query)
            .timeout(self.config.timeout_seconds)
    }
}

#[derive(Debug, Deserialize)]
struct EvaluatorOutput {
    #[serde(default)]
    result: Vec<EvaluatorResult>,
}

#[derive(Debug, Deserialize)]
struct EvaluatorResult {
    #[serde(default)]
    expressions: Vec<EvaluatorExpression>,
}

#[derive(Debug, Deserialize)]
struct EvaluatorExpression {
    value: serde_json::Value,
}

/// Extract the boolean verdict from one evaluator run.
///
/// Non-zero exit, diagnostics on stderr, empty output, and a missing or
/// non-boolean value are all hard failures, never "false".
fn parse_verdict(result: &ExecutionResult) -> EngineResult<bool> {
    if !result.success() {
        return Err(EngineError::Evaluation(format!(
            "evaluator exited with {}: {}",
            result.exit_code,
            result.combined_output().trim()
        )));
    }
    if !result.stderr.trim().is_empty() {
        return Err(EngineError::Evaluation(format!(
            "evaluator produced diagnostics: {}",
            result.stderr.trim()
        )));
    }
    if result.stdout.trim().is_empty() {
        return Err(EngineError::Evaluation("evaluator produced no output".to_string()));
    }

    let output: EvaluatorOutput = serde_json::from_str(&result.stdout)?;
    output
        .result
        .first()
        .and_then(|r| r.expressions.first())
        .and_then(|e| e.value.as_bool())
        .ok_or_else(|| {
            EngineError::Evaluation("evaluator result carries no boolean verdict".to_string())
        })
}
