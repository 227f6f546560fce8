//! Clean command - Delete the generated unified spec.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::CommandContext;

#[derive(Args)]
pub struct CleanArgs {
    /// Output path to delete (overrides spec.output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: CleanArgs, mut ctx: CommandContext) -> Result<()> {
    if let Some(output) = args.output {
        ctx.config.spec.output = output;
    }
    let output = ctx.config.spec.output_path(&ctx.root);

    if output.is_file() {
        fs::remove_file(&output)
            .with_context(|| format!("Failed to delete {}", output.display()))?;
        info!("Removed {:?}", output);
        ctx.say(format!("🧹 Removed {}", output.display()));
    } else {
        ctx.say(format!("Nothing to clean at {}", output.display()));
    }
    Ok(())
}
