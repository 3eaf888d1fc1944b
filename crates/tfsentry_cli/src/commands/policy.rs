//! Policy command - compile and print the configured rule documents.

use anyhow::Result;
use clap::Args;

use tfsentry_engine::Pipeline;

use crate::config::Config;

#[derive(Args)]
pub struct PolicyArgs {}

pub async fn execute(_args: PolicyArgs, config: Config) -> Result<()> {
    let pipeline = Pipeline::new(config.pipeline()?);
    let rules = pipeline.compile_policy().await;

    if rules.is_empty() {
        println!("⚠️  No policies configured; validation would be vacuously true");
        return Ok(());
    }

    for rule in rules {
        println!("# --- {} ---", rule.name);
        println!("{}", rule.body.trim_end());
        println!();
    }
    Ok(())
}
