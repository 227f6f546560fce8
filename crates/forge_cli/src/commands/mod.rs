//! CLI command definitions.
//!
//! Each subcommand maps to one named engine operation. Every operation runs
//! to completion on its own; nothing is shared between invocations except
//! the files on disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use forge_policy::{ForgeConfig, Report};

pub mod assemble;
pub mod audit;
pub mod clean;
pub mod enforce;
pub mod fragment_health;
pub mod full_health;
pub mod module_topology;
pub mod version_check;

/// specforge - API fragment assembly and consistency audits
#[derive(Parser)]
#[command(name = "specforge")]
#[command(version, about = "specforge - API fragment assembly and consistency audits")]
#[command(long_about = r#"
specforge merges API description fragments into one unified document and
audits them before a release is allowed to proceed.

OPERATIONS:
  assemble                   → Merge fragments + core schema into the unified spec
  audit                      → Security schemes, operationId coverage, enum casing
  fragment-health            → Duplicate paths and missing per-method metadata
  enforce                    → Release gate: assemble, measure, fail on any issue
  version-consistency-check  → Catalog versions vs. versions quoted in docs
  module-topology-report     → Toolchain/target levels and capability flags
  full-health                → Topology report + spec freshness/coverage summary
  clean                      → Delete the generated unified spec

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Validation failure (enforcement violation, version drift)
  4 - Missing input (fragments directory, core schema)
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Repository root that relative paths resolve against
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (defaults to <root>/specforge.toml when present)
    #[arg(long, global = true, env = "SPECFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit structured JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge fragments into the unified spec
    Assemble(assemble::AssembleArgs),

    /// Audit the unified document (or each fragment) for structural problems
    Audit(audit::AuditArgs),

    /// Report duplicate paths and methods missing operationId/security
    #[command(name = "fragment-health")]
    FragmentHealth(fragment_health::FragmentHealthArgs),

    /// Run the release gate
    Enforce(enforce::EnforceArgs),

    /// Compare catalog versions with versions mentioned in documentation
    #[command(name = "version-consistency-check")]
    VersionConsistencyCheck(version_check::VersionCheckArgs),

    /// Summarize module toolchain, target, and capability configuration
    #[command(name = "module-topology-report")]
    ModuleTopologyReport(module_topology::ModuleTopologyArgs),

    /// Module topology plus spec freshness, without the strict gate
    #[command(name = "full-health")]
    FullHealth(full_health::FullHealthArgs),

    /// Delete the generated unified spec
    Clean(clean::CleanArgs),
}

/// Shared settings resolved once per invocation.
pub struct CommandContext {
    pub root: PathBuf,
    pub config: ForgeConfig,
    pub json: bool,
    pub quiet: bool,
}

impl CommandContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = if cli.root.is_absolute() {
            cli.root.clone()
        } else {
            std::env::current_dir()?.join(&cli.root)
        };
        let config = ForgeConfig::discover(&root, cli.config.as_deref())
            .context("Failed to load configuration")?;

        Ok(Self {
            root,
            config,
            json: cli.json,
            quiet: cli.quiet,
        })
    }

    /// Print a report in the selected format.
    pub fn emit(&self, report: &Report) -> Result<()> {
        let rendered = report.render(self.json).context("Failed to serialize report")?;
        println!("{}", rendered.trim_end());
        Ok(())
    }

    /// Print a status line unless `--quiet` or `--json` is set.
    pub fn say(&self, message: impl AsRef<str>) {
        if !self.quiet && !self.json {
            println!("{}", message.as_ref());
        }
    }
}
