//! Fragment health command - Duplicate paths and missing method metadata.

use anyhow::Result;
use clap::Args;

use forge_policy::Report;
use forge_spec::FragmentHealthAnalyzer;

use super::assemble::AssembleArgs;
use super::CommandContext;

#[derive(Args)]
pub struct FragmentHealthArgs {
    #[command(flatten)]
    pub spec: AssembleArgs,
}

pub async fn execute(args: FragmentHealthArgs, mut ctx: CommandContext) -> Result<()> {
    args.spec.apply(&mut ctx);
    let spec = &ctx.config.spec;
    let set = spec.loader().load_or_empty(spec.fragments_dir(&ctx.root))?;

    let issues = FragmentHealthAnalyzer::new().analyze(&set.fragments).into_issues();
    let mut report = Report::from_issues("Fragment Health", issues, false);
    report.counts.insert("fragments".to_string(), set.fragments.len());
    ctx.emit(&report)
}
