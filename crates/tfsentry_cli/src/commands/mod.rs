//! CLI command definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod events;
pub mod policy;
pub mod validate;

#[derive(Parser)]
#[command(
    name = "tfsentry",
    about = "Validate Terraform configuration against security policies",
    version
)]
pub struct Cli {
    /// Configuration file (default: tfsentry.yaml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a configuration against the configured policies
    Validate(validate::ValidateArgs),
    /// Print the synthetic events a configuration would cause
    Events(events::EventsArgs),
    /// Print the compiled rule documents
    Policy(policy::PolicyArgs),
}
