//! Enforce command - Run the release gate.
//!
//! Assembles the unified spec, checks operationId coverage of the written
//! output against the threshold, and re-runs fragment health. Any issue
//! fails the command with the validation exit code.

use anyhow::Result;
use clap::Args;
use tracing::info;

use forge_policy::{EnforcementGate, PolicyError, Report};

use super::assemble::AssembleArgs;
use super::CommandContext;

#[derive(Args)]
pub struct EnforceArgs {
    #[command(flatten)]
    pub spec: AssembleArgs,

    /// Minimum operationId coverage in percent (overrides gate.min_coverage)
    #[arg(long)]
    pub min_coverage: Option<f64>,
}

pub async fn execute(args: EnforceArgs, mut ctx: CommandContext) -> Result<()> {
    args.spec.apply(&mut ctx);
    if let Some(min) = args.min_coverage {
        if !(0.0..=100.0).contains(&min) {
            anyhow::bail!(PolicyError::InvalidConfiguration(format!(
                "--min-coverage must be between 0 and 100, got {}",
                min
            )));
        }
        ctx.config.gate.min_coverage = min;
    }

    info!("Running enforcement gate in {:?}", ctx.root);
    let gate = EnforcementGate::new(ctx.config.spec.clone(), ctx.config.gate.clone());

    let evaluation = gate.evaluate(&ctx.root)?;
    ctx.emit(&Report::from_gate(&evaluation))?;
    EnforcementGate::verdict(evaluation)?;
    ctx.say("\n✅ Enforcement gate PASSED");
    Ok(())
}
