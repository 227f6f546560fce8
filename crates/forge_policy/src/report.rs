//! Text and JSON rendering shared by every operation.

use std::collections::BTreeMap;

use serde::Serialize;

use forge_spec::{count_by_kind, Issue};

use crate::enforcement::GateEvaluation;
use crate::freshness::SpecFreshness;
use crate::topology::TopologyReport;

/// Error marker used by blocking reports.
pub const ERROR_MARKER: &str = "❌";
/// Warning marker used by informational reports.
pub const WARNING_MARKER: &str = "⚠️ ";

/// Report produced by an operation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub passed: bool,
    /// Whether issues block a release (selects the issue marker).
    pub blocking: bool,
    pub counts: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
    pub inconsistent_lists: BTreeMap<String, Vec<String>>,
    pub issues: Vec<Issue>,
}

impl Report {
    pub fn new(title: impl Into<String>, blocking: bool) -> Self {
        Self {
            title: title.into(),
            passed: true,
            blocking,
            ..Default::default()
        }
    }

    /// Report over a list of issues, counted by kind.
    pub fn from_issues(title: impl Into<String>, issues: Vec<Issue>, blocking: bool) -> Self {
        let mut report = Self::new(title, blocking);
        report.counts = count_by_kind(&issues);
        report.counts.insert("issues".to_string(), issues.len());
        report.passed = issues.is_empty() || !blocking;
        report.issues = issues;
        report
    }

    pub fn from_gate(evaluation: &GateEvaluation) -> Self {
        let mut report = Self::from_issues("Enforcement Gate", evaluation.issues.clone(), true);
        report.counts.insert("fragments".to_string(), evaluation.fragment_count);
        report.counts.insert("operations".to_string(), evaluation.coverage.operation_count);
        report
            .counts
            .insert("operation_ids".to_string(), evaluation.coverage.operation_id_count);
        report
            .metrics
            .insert("coverage_percent".to_string(), evaluation.coverage.coverage_percent);
        report
            .metrics
            .insert("min_coverage".to_string(), evaluation.min_coverage);
        report
    }

    pub fn from_topology(topology: &TopologyReport) -> Self {
        let mut report = Self::new("Module Topology", false);
        report.counts.insert("modules".to_string(), topology.module_count);
        for (level, count) in &topology.toolchain_levels {
            report.counts.insert(format!("toolchain_{}", level), *count);
        }
        for (level, count) in &topology.target_levels {
            report.counts.insert(format!("target_{}", level), *count);
        }
        for (capability, count) in &topology.capability_counts {
            report.counts.insert(format!("capability_{}", capability), *count);
        }
        report.inconsistent_lists.insert(
            "inconsistentToolchain".to_string(),
            topology.inconsistent_toolchain.clone(),
        );
        report.inconsistent_lists.insert(
            "missingUiToolkitInAndroidModules".to_string(),
            topology.missing_ui_toolkit_in_android_modules.clone(),
        );
        report
    }

    /// Add the spec freshness summary to this report.
    pub fn with_freshness(mut self, freshness: &SpecFreshness) -> Self {
        self.counts.insert("fragments".to_string(), freshness.fragment_count);
        self.counts
            .insert("spec_output_present".to_string(), usize::from(freshness.output_exists));
        if let Some(coverage) = &freshness.coverage {
            self.counts.insert("operations".to_string(), coverage.operation_count);
            self.counts
                .insert("operation_ids".to_string(), coverage.operation_id_count);
            self.metrics
                .insert("coverage_percent".to_string(), coverage.coverage_percent);
        }
        self.inconsistent_lists
            .insert("staleFragments".to_string(), freshness.stale_fragments.clone());
        self
    }

    /// Render as text or pretty JSON.
    pub fn render(&self, json: bool) -> serde_json::Result<String> {
        if json {
            serde_json::to_string_pretty(self)
        } else {
            Ok(self.render_text())
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let status = if !self.passed {
            format!("{} FAILED", ERROR_MARKER)
        } else if self.issues.is_empty() {
            "✅ PASSED".to_string()
        } else {
            format!("{}{} issue(s), informational", WARNING_MARKER, self.issues.len())
        };

        out.push_str(&format!("== {} ==\n", self.title));
        out.push_str(&format!("Status: {}\n", status));

        if !self.counts.is_empty() {
            out.push_str("\nCounts:\n");
            for (key, value) in &self.counts {
                out.push_str(&format!("  {}: {}\n", key, value));
            }
        }
        for (key, value) in &self.metrics {
            out.push_str(&format!("  {}: {:.2}\n", key, value));
        }
        for (name, entries) in &self.inconsistent_lists {
            if entries.is_empty() {
                out.push_str(&format!("\n{}: none\n", name));
            } else {
                out.push_str(&format!("\n{}:\n", name));
                for entry in entries {
                    out.push_str(&format!("  - {}\n", entry));
                }
            }
        }

        if !self.issues.is_empty() {
            out.push('\n');
            let marker = if self.blocking { ERROR_MARKER } else { WARNING_MARKER };
            for issue in &self.issues {
                out.push_str(&format!("{} {}\n", marker, issue));
            }
        }
        out
    }
}
