//! Module topology command - Toolchain, target, and capability summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use forge_policy::{load_descriptors, ModuleDescriptor, ModuleTopologyReporter, Report};

use super::CommandContext;

#[derive(Args)]
pub struct ModuleTopologyArgs {
    /// Module descriptor file, YAML or JSON (overrides topology.modules_file)
    #[arg(long)]
    pub modules: Option<PathBuf>,

    /// Expected toolchain level (overrides topology.expected_toolchain)
    #[arg(long)]
    pub expected_toolchain: Option<String>,
}

impl ModuleTopologyArgs {
    pub fn apply(&self, ctx: &mut CommandContext) {
        if let Some(modules) = &self.modules {
            ctx.config.topology.modules_file = modules.clone();
        }
        if let Some(level) = &self.expected_toolchain {
            ctx.config.topology.expected_toolchain = level.clone();
        }
    }
}

/// Read the descriptor file; an absent file means no modules.
pub fn read_modules(ctx: &CommandContext) -> Result<Vec<ModuleDescriptor>> {
    let path = ctx.config.topology.modules_path(&ctx.root);
    if !path.is_file() {
        warn!("Module descriptor file {:?} not found, reporting zero modules", path);
        return Ok(Vec::new());
    }
    load_descriptors(&path)
        .with_context(|| format!("Failed to read module descriptors {}", path.display()))
}

pub fn topology_report(ctx: &CommandContext) -> Result<Report> {
    let modules = read_modules(ctx)?;
    let reporter = ModuleTopologyReporter::new(&ctx.config.topology.expected_toolchain);
    Ok(Report::from_topology(&reporter.report(&modules)))
}

pub async fn execute(args: ModuleTopologyArgs, mut ctx: CommandContext) -> Result<()> {
    args.apply(&mut ctx);
    let report = topology_report(&ctx)?;
    ctx.emit(&report)
}
