//! Policy compilation through the external rule compiler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use tfsentry_exec::{NameSeq, ToolInvocation, ToolRunner};

use crate::error::{PolicyError, PolicyResult};
use crate::settings::PolicySettings;

const DEFAULT_COMPILER: &str = "rule2rego";
const COMPILE_TIMEOUT_SECONDS: u64 = 120;

/// Where a rule document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Inline,
    Path(PathBuf),
}

/// One compiled rule document in the evaluator's rule language.
#[derive(Debug, Clone)]
pub struct RuleDocument {
    pub name: String,
    pub source: RuleSource,
    pub body: String,
}

/// Compiles policy sources into rule documents.
///
/// The rule compiler executable is injected rather than assumed on a
/// fixed filesystem layout; tests substitute a mock runner.
pub struct PolicyCompiler {
    runner: Arc<dyn ToolRunner>,
    program: String,
    names: NameSeq,
}

impl PolicyCompiler {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            program: DEFAULT_COMPILER.to_string(),
            names: NameSeq::new(),
        }
    }

    /// Use a specific rule compiler executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a specific name sequence for temporary files.
    pub fn with_names(mut self, names: NameSeq) -> Self {
        self.names = names;
        self
    }

    /// Compile both policy sources and concatenate their rule documents.
    ///
    /// A failure in either source is logged and does not suppress the
    /// other source's contribution. The result may legitimately be
    /// empty; validation against an empty rule set is vacuously true.
    pub async fn compile_all(&self, settings: &PolicySettings) -> Vec<RuleDocument> {
        let mut rules = Vec::new();

        if let Some(value) = &settings.inline {
            match self.compile_inline(value).await {
                Ok(document) => rules.push(document),
                Err(e) => warn!("failed to compile inline policy: {e}"),
            }
        }

        match self.compile_path(settings.path.as_deref()).await {
            Ok(documents) => rules.extend(documents),
            Err(e) => warn!("failed to compile path policy: {e}"),
        }

        info!(rules = rules.len(), "policy compilation complete");
        rules
    }

    /// Compile the inline policy value.
    ///
    /// The value is serialized to a uniquely named file in a scoped
    /// temporary directory, the rule compiler is invoked on it, and the
    /// directory is removed on success and failure alike. Returns the
    /// compiler's first document.
    pub async fn compile_inline(&self, value: &serde_json::Value) -> PolicyResult<RuleDocument> {
        let dir = tempfile::Builder::new()
            .prefix("tfsentry-policy-")
            .tempdir()?;
        let result = self.compile_inline_in(dir.path(), value).await;
        if let Err(e) = dir.close() {
            warn!("failed to remove policy temp dir: {e}");
        }
        result
    }

    async fn compile_inline_in(
        &self,
        dir: &Path,
        value: &serde_json::Value,
    ) -> PolicyResult<RuleDocument> {
        let policy_path = dir.join(self.names.next("policy", "json"));
        tokio::fs::write(&policy_path, serde_json::to_vec(value)?).await?;
        debug!(path = %policy_path.display(), "compiling inline policy");

        let documents = self.invoke_compiler(&policy_path).await?;
        let body = documents.into_iter().next().ok_or(PolicyError::EmptyOutput)?;
        Ok(RuleDocument {
            name: "inline".to_string(),
            source: RuleSource::Inline,
            body,
        })
    }

    /// Compile the path-referenced policy.
    ///
    /// No configured path is a valid state and yields no documents; a
    /// configured path that does not exist is an error.
    pub async fn compile_path(&self, path: Option<&Path>) -> PolicyResult<Vec<RuleDocument>> {
        let Some(path) = path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Err(PolicyError::NotFound(path.to_path_buf()));
        }
        debug!(path = %path.display(), "compiling path policy");

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "policy".to_string());
        let documents = self.invoke_compiler(path).await?;
        Ok(documents
            .into_iter()
            .enumerate()
            .map(|(i, body)| RuleDocument {
                name: format!("{stem}-{i}"),
                source: RuleSource::Path(path.to_path_buf()),
                body,
            })
            .collect())
    }

    /// Run the rule compiler on a policy file. Stdout is a JSON array of
    /// rule documents.
    async fn invoke_compiler(&self, policy_path: &Path) -> PolicyResult<Vec<String>> {
        let invocation = ToolInvocation::new(&self.program)
            .arg(policy_path.display().to_string())
            .timeout(COMPILE_TIMEOUT_SECONDS);
        let result = self.runner.run(&invocation).await?;
        if !result.success() {
            return Err(PolicyError::CompileFailure(
                result.combined_output().trim().to_string(),
            ));
        }
        Ok(serde_json::from_str(&result.stdout)?)
    }
}
