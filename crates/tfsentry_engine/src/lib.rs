//! # tfsentry_engine
//!
//! The validation engine and the pipeline that feeds it.
//!
//! [`Validator`] evaluates every compiled rule against every synthesized
//! event through the external evaluator and reduces the cross product to
//! a single [`Verdict`] by logical AND: the infrastructure is valid only
//! if every event is permitted under every rule. [`Pipeline`] wires the
//! front end, the synthesizer, the policy compiler, and the validator
//! into the one call the CLI makes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tfsentry_engine::{Pipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(PipelineConfig::default());
//!     let verdict = pipeline.validate("./infrastructure".as_ref()).await?;
//!     println!("{}", verdict.summary());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod pipeline;
pub mod validator;
pub mod verdict;

pub use error::{EngineError, EngineResult};
pub use pipeline::{Pipeline, PipelineConfig};
pub use validator::{EvaluatorConfig, Validator};
pub use verdict::Verdict;
