//! Events command - print the synthesized event stream.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tfsentry_engine::Pipeline;

use crate::config::Config;

#[derive(Args)]
pub struct EventsArgs {
    /// Path to the Terraform configuration (file or directory)
    pub path: PathBuf,
}

pub async fn execute(args: EventsArgs, config: Config) -> Result<()> {
    let pipeline = Pipeline::new(config.pipeline()?);
    let events = pipeline.synthesize(&args.path)?;

    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}
