//! Mock tool runner for testing.
//!
//! Captures every invocation and returns predefined responses, so
//! policy-compiler and engine tests run without the external rule
//! compiler or evaluator installed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{ExecError, ExecResult};
use crate::invocation::{ExecutionResult, ToolInvocation};
use crate::runner::ToolRunner;

/// Predefined response for one `run` call.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// A response whose stderr carries diagnostics despite exit code 0.
    pub fn diagnostic(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// One captured invocation, for verification.
#[derive(Debug, Clone)]
pub struct CapturedInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

/// Mock implementation of [`ToolRunner`].
#[derive(Clone, Default)]
pub struct MockToolRunner {
    responses: Arc<RwLock<Vec<MockResponse>>>,
    response_index: Arc<AtomicUsize>,
    captured: Arc<RwLock<Vec<CapturedInvocation>>>,
    unavailable: Arc<RwLock<Vec<String>>>,
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `run` call. Responses cycle once
    /// exhausted.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Mark a program as unavailable.
    pub fn set_unavailable(self, program: impl Into<String>) -> Self {
        self.unavailable.write().push(program.into());
        self
    }

    /// Make every `run` call fail at the spawn layer.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<CapturedInvocation> {
        self.captured.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured.read().len()
    }

    /// Invocations of a specific program.
    pub fn calls_to(&self, program: &str) -> Vec<CapturedInvocation> {
        self.captured
            .read()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }

    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses[index % responses.len()].clone()
    }
}

#[async_trait]
impl ToolRunner for MockToolRunner {
    async fn is_available(&self, program: &str) -> bool {
        !self.unavailable.read().iter().any(|p| p == program)
    }

    async fn run(&self, invocation: &ToolInvocation) -> ExecResult<ExecutionResult> {
        self.captured.write().push(CapturedInvocation {
            program: invocation.program.clone(),
            args: invocation.args.clone(),
            current_dir: invocation.current_dir.clone(),
        });

        if let Some(message) = self.simulate_failure.read().clone() {
            return Err(ExecError::Spawn {
                program: invocation.program.clone(),
                message,
            });
        }

        let response = self.next_response();
        Ok(ExecutionResult {
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            duration_ms: 1,
        })
    }
}
