//! Release gate over the assembled spec and its source fragments.
//!
//! The gate assembles the unified document, measures operation id coverage
//! on what was written, re-runs the fragment health checks, and fails when
//! anything is outstanding.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use forge_spec::{
    CoverageMetric, FragmentHealthAnalyzer, Issue, IssueCollector, IssueDetail, IssueKind,
    Location, StructuralAuditor, ASSEMBLED_METHOD_INDENT,
};

use crate::config::{GateConfig, SpecConfig};
use crate::error::{PolicyError, PolicyResult};

/// Everything the gate measured, before deciding pass/fail.
#[derive(Debug, Clone, Serialize)]
pub struct GateEvaluation {
    pub output: PathBuf,
    pub fragment_count: usize,
    pub coverage: CoverageMetric,
    pub min_coverage: f64,
    pub issues: Vec<Issue>,
}

impl GateEvaluation {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// The enforcement gate.
pub struct EnforcementGate {
    spec: SpecConfig,
    gate: GateConfig,
}

impl EnforcementGate {
    pub fn new(spec: SpecConfig, gate: GateConfig) -> Self {
        Self { spec, gate }
    }

    /// Run the gate and fail with [`PolicyError::EnforcementViolation`] if any
    /// issue remains.
    pub fn enforce(&self, root: &Path) -> PolicyResult<GateEvaluation> {
        Self::verdict(self.evaluate(root)?)
    }

    /// Turn an evaluation into pass/fail.
    pub fn verdict(evaluation: GateEvaluation) -> PolicyResult<GateEvaluation> {
        if evaluation.passed() {
            info!(
                "Enforcement passed: {} fragments, {}",
                evaluation.fragment_count, evaluation.coverage
            );
            Ok(evaluation)
        } else {
            error!("Enforcement failed with {} issue(s)", evaluation.issues.len());
            Err(PolicyError::EnforcementViolation(evaluation.issues))
        }
    }

    /// Assemble, measure, and collect issues without failing on them.
    ///
    /// Missing fragments directory and missing core schema still abort.
    pub fn evaluate(&self, root: &Path) -> PolicyResult<GateEvaluation> {
        let set = self.spec.loader().load(self.spec.fragments_dir(root))?;
        let output = self.spec.output_path(root);
        self.spec.assembler().assemble_to(&set, &output)?;

        let written: Vec<String> = fs::read_to_string(&output)?
            .lines()
            .map(str::to_string)
            .collect();
        let coverage = StructuralAuditor::coverage_of(&written, ASSEMBLED_METHOD_INDENT);

        let mut issues = FragmentHealthAnalyzer::new().analyze(&set.fragments);
        issues.merge(self.coverage_issue(&output, coverage));

        Ok(GateEvaluation {
            output,
            fragment_count: set.fragments.len(),
            coverage,
            min_coverage: self.gate.min_coverage,
            issues: issues.into_issues(),
        })
    }

    fn coverage_issue(&self, output: &Path, coverage: CoverageMetric) -> IssueCollector {
        let mut issues = IssueCollector::new();
        if coverage.coverage_percent < self.gate.min_coverage {
            issues.add(
                Issue::new(
                    IssueKind::LowOperationIdCoverage,
                    Location::file(output.display().to_string()),
                    format!(
                        "Operation id coverage {:.2}% is below the required {}% ({})",
                        coverage.coverage_percent, self.gate.min_coverage, coverage
                    ),
                )
                .with_detail(IssueDetail::Coverage { metric: coverage }),
            );
        }
        issues
    }
}
