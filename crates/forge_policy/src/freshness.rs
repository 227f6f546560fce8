//! Freshness and coverage of the generated spec, without running the gate.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use tracing::debug;

use forge_spec::{CoverageMetric, Document, StructuralAuditor};

use crate::config::SpecConfig;
use crate::error::PolicyResult;

/// Whether the generated output reflects the current fragments.
#[derive(Debug, Clone, Serialize)]
pub struct SpecFreshness {
    pub output: PathBuf,
    pub output_exists: bool,
    pub fragment_count: usize,
    /// Fragments (core schema included) modified after the output was written.
    pub stale_fragments: Vec<String>,
    /// Coverage of the generated output, if present.
    pub coverage: Option<CoverageMetric>,
}

impl SpecFreshness {
    pub fn is_fresh(&self) -> bool {
        self.output_exists && self.stale_fragments.is_empty()
    }

    /// Inspect fragments and output under `root`. A missing fragments
    /// directory counts as an empty set.
    pub fn inspect(config: &SpecConfig, root: &Path) -> PolicyResult<Self> {
        let dir = config.fragments_dir(root);
        let set = config.loader().load_or_empty(&dir)?;
        let output = config.output_path(root);

        let output_modified = modified(&output);
        let mut stale_fragments = Vec::new();
        for file in set.all_files() {
            let fragment_modified = modified(&dir.join(&file.name));
            let stale = match (output_modified, fragment_modified) {
                (Some(out), Some(frag)) => frag > out,
                (None, _) => true,
                (Some(_), None) => false,
            };
            if stale {
                debug!("Fragment {} is newer than {:?}", file.name, output);
                stale_fragments.push(file.name.clone());
            }
        }

        let coverage = if output_modified.is_some() {
            let text = fs::read_to_string(&output)?;
            let document = Document::assembled(output.display().to_string(), &text);
            Some(StructuralAuditor::coverage(&document))
        } else {
            None
        };

        Ok(Self {
            output_exists: output_modified.is_some(),
            output,
            fragment_count: set.fragments.len(),
            stale_fragments,
            coverage,
        })
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_output_marks_everything_stale() {
        let temp = tempdir().unwrap();
        let config = SpecConfig::default();
        let dir = config.fragments_dir(temp.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.yml"), "/a:\n").unwrap();

        let freshness = SpecFreshness::inspect(&config, temp.path()).unwrap();
        assert!(!freshness.output_exists);
        assert!(!freshness.is_fresh());
        assert_eq!(freshness.stale_fragments, vec!["a.yml"]);
        assert!(freshness.coverage.is_none());
    }

    #[test]
    fn test_written_output_reports_coverage() {
        let temp = tempdir().unwrap();
        let config = SpecConfig::default();
        let dir = config.fragments_dir(temp.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.yml"), "/a:\n  get:\n    operationId: a\n").unwrap();
        fs::write(dir.join("core-schema.yml"), "components:\n  schemas: {}\n").unwrap();

        let set = config.loader().load(&dir).unwrap();
        config
            .assembler()
            .assemble_to(&set, config.output_path(temp.path()))
            .unwrap();

        let freshness = SpecFreshness::inspect(&config, temp.path()).unwrap();
        assert!(freshness.output_exists);
        assert_eq!(freshness.fragment_count, 1);
        let coverage = freshness.coverage.unwrap();
        assert_eq!(coverage.operation_count, 1);
        assert_eq!(coverage.coverage_percent, 100.0);
    }
}
