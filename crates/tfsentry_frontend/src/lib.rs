//! # tfsentry_frontend
//!
//! Source discovery and front-end dispatch.
//!
//! A [`Frontend`] turns discovered source files into a resolved
//! [`tfsentry_ir::Graph`]. Front ends are registered per source
//! [`Language`] in a [`FrontendRegistry`]; adding a language is a
//! registration, not a dispatcher rewrite. [`TerraformFrontend`] is the
//! built-in front end for HCL configuration.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tfsentry_frontend::{FrontendRegistry, Language};
//!
//! let registry = FrontendRegistry::with_defaults();
//! let graph = registry.compile(Language::Terraform, "./infrastructure".as_ref())?;
//! println!("{} resources", graph.resources().count());
//! # Ok::<(), tfsentry_frontend::FrontendError>(())
//! ```

pub mod discover;
pub mod error;
pub mod registry;
pub mod terraform;

pub use discover::{discover, WalkOptions};
pub use error::{FrontendError, FrontendResult};
pub use registry::{Frontend, FrontendRegistry, Language};
pub use terraform::TerraformFrontend;
