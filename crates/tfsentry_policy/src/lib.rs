//! # tfsentry_policy
//!
//! Compiles user policy into rule documents.
//!
//! A policy arrives one of two ways: as an inline structured value in
//! the configuration, or as a filesystem path to a policy source. Both
//! routes go through the external rule compiler and produce Rego
//! [`RuleDocument`]s; each route fails in isolation, so a broken inline
//! policy never suppresses the rules a policy file would contribute.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tfsentry_exec::CliToolRunner;
//! use tfsentry_policy::{PolicyCompiler, PolicySettings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = PolicySettings {
//!         inline: Some(serde_json::json!({"source": ["aws.s3"]})),
//!         path: None,
//!     };
//!     let compiler = PolicyCompiler::new(Arc::new(CliToolRunner::new()));
//!     let rules = compiler.compile_all(&settings).await;
//!     println!("{} rule documents", rules.len());
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod settings;

pub use compiler::{PolicyCompiler, RuleDocument, RuleSource};
pub use error::{PolicyError, PolicyResult};
pub use settings::PolicySettings;
