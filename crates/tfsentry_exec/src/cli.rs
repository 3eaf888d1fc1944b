//! Tokio-process implementation of the tool runner.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ExecError, ExecResult};
use crate::invocation::{ExecutionResult, ToolInvocation};
use crate::runner::ToolRunner;

/// Runs external tools as plain child processes.
///
/// Children are spawned with `kill_on_drop`, so dropping an in-flight
/// invocation future (timeout or caller cancellation) terminates the
/// process instead of leaking it.
#[derive(Debug, Clone, Default)]
pub struct CliToolRunner;

impl CliToolRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for CliToolRunner {
    async fn is_available(&self, program: &str) -> bool {
        Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn run(&self, invocation: &ToolInvocation) -> ExecResult<ExecutionResult> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }

        debug!("executing: {}", invocation.display());
        let start = Instant::now();

        let child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ExecError::ToolNotFound(invocation.program.clone()),
            _ => ExecError::Spawn {
                program: invocation.program.clone(),
                message: e.to_string(),
            },
        })?;

        let output = if invocation.timeout_seconds > 0 {
            let limit = Duration::from_secs(invocation.timeout_seconds);
            match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                // Dropping the future killed the child via kill_on_drop.
                Err(_) => {
                    return Err(ExecError::Timeout(
                        invocation.program.clone(),
                        invocation.timeout_seconds,
                    ))
                }
            }
        } else {
            child.wait_with_output().await?
        };

        Ok(ExecutionResult {
            exit_code: output.status.code().unwrap_or(-1) as i64,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
