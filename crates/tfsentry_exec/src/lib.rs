//! # tfsentry_exec
//!
//! External tool invocation for tfsentry.
//!
//! The policy compiler and the validation engine both shell out to
//! external executables (the rule compiler and the `opa` evaluator).
//! This crate provides the seam they share:
//!
//! - **[`ToolRunner`]**: the async trait both stages depend on
//! - **[`CliToolRunner`]**: tokio-process implementation with timeouts
//!   and kill-on-drop cancellation
//! - **[`MockToolRunner`]**: canned responses and captured calls for
//!   tests, no external binaries required
//! - **[`NameSeq`]**: the injectable unique-name generator used for
//!   scoped temporary files
//!
//! ## Example
//!
//! ```rust,no_run
//! use tfsentry_exec::{CliToolRunner, ToolInvocation, ToolRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = CliToolRunner::new();
//!     let invocation = ToolInvocation::new("opa").arg("version").timeout(30);
//!     let result = runner.run(&invocation).await?;
//!     println!("exit code: {}", result.exit_code);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod invocation;
pub mod mock;
pub mod names;
pub mod runner;

pub use cli::CliToolRunner;
pub use error::{ExecError, ExecResult};
pub use invocation::{ExecutionResult, ToolInvocation};
pub use mock::{CapturedInvocation, MockResponse, MockToolRunner};
pub use names::NameSeq;
pub use runner::ToolRunner;
