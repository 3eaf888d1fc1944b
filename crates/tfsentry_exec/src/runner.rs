//! Tool runner trait.

use async_trait::async_trait;

use crate::error::ExecResult;
use crate::invocation::{ExecutionResult, ToolInvocation};

/// Seam between the pipeline and the external executables it drives.
///
/// Production code uses [`crate::CliToolRunner`]; tests substitute
/// [`crate::MockToolRunner`].
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Check whether an executable can be invoked at all.
    async fn is_available(&self, program: &str) -> bool;

    /// Run a tool to completion and capture its output.
    ///
    /// A non-zero exit code is a successful `run` with a failing
    /// [`ExecutionResult`]; only spawn problems and timeouts are `Err`.
    async fn run(&self, invocation: &ToolInvocation) -> ExecResult<ExecutionResult>;
}
