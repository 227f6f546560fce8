//! Version consistency command - Catalog versions vs. documentation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use forge_policy::{load_documentation, PolicyError, Report, VersionCatalog, VersionDriftChecker};

use super::CommandContext;

#[derive(Args)]
pub struct VersionCheckArgs {
    /// Version catalog (overrides versions.catalog)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Documentation files or globs to scan (overrides versions.docs)
    #[arg(long = "doc")]
    pub docs: Vec<String>,
}

pub async fn execute(args: VersionCheckArgs, mut ctx: CommandContext) -> Result<()> {
    if let Some(catalog) = args.catalog {
        ctx.config.versions.catalog = catalog;
    }
    if !args.docs.is_empty() {
        ctx.config.versions.docs = args.docs;
    }

    let versions = &ctx.config.versions;
    let catalog_path = versions.catalog_path(&ctx.root);
    let catalog = VersionCatalog::load(&catalog_path)
        .with_context(|| format!("Failed to read version catalog {}", catalog_path.display()))?;
    let docs = load_documentation(&ctx.root, &versions.docs);
    info!("Checking {} catalog entries against {} documents", catalog.len(), docs.len());

    let checker = VersionDriftChecker::new(versions);
    match checker.check_versions(&catalog, &docs) {
        Ok(()) => {
            let mut report = Report::from_issues("Version Consistency", Vec::new(), true);
            report.counts.insert("catalog_entries".to_string(), catalog.len());
            report.counts.insert("documents".to_string(), docs.len());
            ctx.emit(&report)
        }
        Err(PolicyError::VersionDrift(issues)) => {
            ctx.emit(&Report::from_issues("Version Consistency", issues.clone(), true))?;
            Err(PolicyError::VersionDrift(issues).into())
        }
        Err(e) => Err(e.into()),
    }
}
