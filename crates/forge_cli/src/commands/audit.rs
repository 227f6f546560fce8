//! Audit command - Structural checks over the unified document or fragments.

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use forge_policy::Report;
use forge_spec::{Document, FragmentHealthAnalyzer, SpecError, StructuralAuditor};

use super::assemble::AssembleArgs;
use super::CommandContext;

#[derive(Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub spec: AssembleArgs,

    /// Audit each fragment on its own instead of the assembled document.
    ///
    /// The assembled document keeps only the first declaration of a
    /// duplicated path, so problems inside later copies only show up here.
    #[arg(long)]
    pub per_fragment: bool,
}

pub async fn execute(args: AuditArgs, mut ctx: CommandContext) -> Result<()> {
    args.spec.apply(&mut ctx);
    let spec = &ctx.config.spec;
    let set = spec.loader().load_or_empty(spec.fragments_dir(&ctx.root))?;

    let documents = if args.per_fragment {
        set.all_files().map(Document::from_fragment).collect()
    } else {
        // Assembled in memory only; the output file is left alone.
        match spec.assembler().assemble(&set) {
            Ok(assembled) => {
                let duplicates = FragmentHealthAnalyzer::new().duplicate_paths(&set.fragments);
                if !duplicates.is_empty() {
                    warn!(
                        "{} duplicated path(s) were dropped from the assembled document; \
                         use --per-fragment to audit every copy",
                        duplicates.len()
                    );
                }
                let name = spec.output.display().to_string();
                vec![Document::assembled(name, &assembled.render())]
            }
            Err(SpecError::MissingCoreSchema(path)) => {
                warn!("No usable core schema at {:?}, auditing fragments individually", path);
                set.all_files().map(Document::from_fragment).collect()
            }
            Err(e) => return Err(e.into()),
        }
    };

    info!("Auditing {} document(s)", documents.len());
    let issues = StructuralAuditor::audit(&documents).into_issues();
    let mut report = Report::from_issues("Structural Audit", issues, false);
    report.counts.insert("documents".to_string(), documents.len());
    ctx.emit(&report)
}
