//! Full health command - Topology report plus spec freshness.
//!
//! Informational only: never fails on findings.

use anyhow::Result;
use clap::Args;

use forge_policy::SpecFreshness;

use super::assemble::AssembleArgs;
use super::module_topology::{topology_report, ModuleTopologyArgs};
use super::CommandContext;

#[derive(Args)]
pub struct FullHealthArgs {
    #[command(flatten)]
    pub spec: AssembleArgs,

    #[command(flatten)]
    pub topology: ModuleTopologyArgs,
}

pub async fn execute(args: FullHealthArgs, mut ctx: CommandContext) -> Result<()> {
    args.spec.apply(&mut ctx);
    args.topology.apply(&mut ctx);

    let freshness = SpecFreshness::inspect(&ctx.config.spec, &ctx.root)?;
    let mut report = topology_report(&ctx)?.with_freshness(&freshness);
    report.title = "Full Health".to_string();
    ctx.emit(&report)?;

    if !freshness.is_fresh() {
        ctx.say(format!(
            "\nℹ️  {} is out of date; run `specforge assemble`",
            freshness.output.display()
        ));
    }
    Ok(())
}
