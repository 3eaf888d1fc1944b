//! Validate command - run the full pipeline and report the verdict.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfsentry_engine::Pipeline;

use crate::config::Config;
use crate::ExitCodes;

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the Terraform configuration (file or directory)
    pub path: PathBuf,
}

pub async fn execute(args: ValidateArgs, config: Config) -> Result<()> {
    info!("Validating configuration: {}", args.path.display());
    println!("🔍 Validating {}", args.path.display());

    let pipeline = Pipeline::new(config.pipeline()?);
    let verdict = pipeline.validate(&args.path).await?;

    if verdict.is_vacuous() {
        println!("⚠️  {}", verdict.summary());
    } else if verdict.valid {
        println!("✅ {}", verdict.summary());
    } else {
        println!("❌ {}", verdict.summary());
        std::process::exit(ExitCodes::VALIDATION_FAILURE as i32);
    }

    Ok(())
}
