//! Assemble command - Merge fragments into the unified spec.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::CommandContext;

#[derive(Args)]
pub struct AssembleArgs {
    /// Fragments directory (overrides spec.fragments_dir)
    #[arg(long)]
    pub fragments: Option<PathBuf>,

    /// Core schema file name inside the fragments directory
    #[arg(long)]
    pub core_schema: Option<String>,

    /// Output path for the unified spec
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl AssembleArgs {
    /// Fold the overrides into the spec configuration.
    pub fn apply(&self, ctx: &mut CommandContext) {
        if let Some(dir) = &self.fragments {
            ctx.config.spec.fragments_dir = dir.clone();
        }
        if let Some(core) = &self.core_schema {
            ctx.config.spec.core_schema = core.clone();
        }
        if let Some(output) = &self.output {
            ctx.config.spec.output = output.clone();
        }
    }
}

pub async fn execute(args: AssembleArgs, mut ctx: CommandContext) -> Result<()> {
    args.apply(&mut ctx);
    let spec = &ctx.config.spec;
    let dir = spec.fragments_dir(&ctx.root);
    let output = spec.output_path(&ctx.root);
    info!("Assembling fragments from {:?}", dir);

    let set = spec.loader().load(&dir)?;
    let assembled = spec
        .assembler()
        .assemble_to(&set, &output)
        .with_context(|| format!("Failed to assemble {}", output.display()))?;

    if ctx.json {
        let summary = serde_json::json!({
            "output": output.display().to_string(),
            "fragments": set.fragments.len(),
            "pathBlocks": assembled.ordered_path_blocks.len(),
            "generatedAt": assembled.header.generated_at,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        ctx.say(format!(
            "✅ Wrote {} ({} fragments, {} path blocks)",
            output.display(),
            set.fragments.len(),
            assembled.ordered_path_blocks.len()
        ));
    }
    Ok(())
}
