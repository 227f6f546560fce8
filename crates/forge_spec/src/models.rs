//! Data model shared by every analysis pass.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fragment document as read from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentFile {
    pub name: String,
    pub raw_lines: Vec<String>,
}

impl FragmentFile {
    pub fn new(name: impl Into<String>, content: &str) -> Self {
        Self {
            name: name.into(),
            raw_lines: content.lines().map(str::to_string).collect(),
        }
    }
}

/// A declared path and the methods found beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    pub path: String,
    /// 1-based line of the path declaration.
    pub line: usize,
    pub methods: Vec<MethodEntry>,
}

/// Metadata flags collected for one method block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodEntry {
    pub method: String,
    pub line: usize,
    pub has_operation_id: bool,
    pub has_security: bool,
}

impl MethodEntry {
    pub fn new(method: impl Into<String>, line: usize) -> Self {
        Self {
            method: method.into(),
            line,
            has_operation_id: false,
            has_security: false,
        }
    }
}

/// Synthesized header of the unified document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecHeader {
    pub title: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub server_url: String,
}

/// The unified document produced by the assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledSpec {
    pub header: SpecHeader,
    /// One block per source fragment, in load order, already re-indented.
    pub ordered_path_blocks: Vec<String>,
    /// Copied verbatim from the core schema.
    pub components_block: String,
}

/// Kinds of structural findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingSecurityScheme,
    MissingOperationId,
    MissingSecurity,
    DuplicatePath,
    MixedEnumCasing,
    LowOperationIdCoverage,
    VersionDrift,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingSecurityScheme => "missing_security_scheme",
            IssueKind::MissingOperationId => "missing_operation_id",
            IssueKind::MissingSecurity => "missing_security",
            IssueKind::DuplicatePath => "duplicate_path",
            IssueKind::MixedEnumCasing => "mixed_enum_casing",
            IssueKind::LowOperationIdCoverage => "low_operation_id_coverage",
            IssueKind::VersionDrift => "version_drift",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an issue was found. `line == 0` means the whole file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    pub fn file(file: impl Into<String>) -> Self {
        Self::new(file, 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}", self.file, self.line)
        }
    }
}

/// Structured payload attached to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueDetail {
    Operation { path: String, method: String },
    DuplicatePath { path: String, files: BTreeSet<String> },
    EnumValues { values: Vec<String> },
    Coverage { metric: CoverageMetric },
    SecurityScheme { scheme: String },
    VersionDrift { tool: String, found: String, expected: String },
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub location: Location,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<IssueDetail>,
}

impl Issue {
    pub fn new(kind: IssueKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: IssueDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Issues gathered by one analysis pass.
///
/// Each pass returns its own collector; callers concatenate them with
/// [`IssueCollector::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueCollector {
    issues: Vec<Issue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: IssueCollector) {
        self.issues.extend(other.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// Number of issues per kind, keyed by the snake_case kind name.
    pub fn counts_by_kind(&self) -> BTreeMap<String, usize> {
        count_by_kind(&self.issues)
    }
}

impl From<Vec<Issue>> for IssueCollector {
    fn from(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

/// Count issues per kind, keyed by the snake_case kind name.
pub fn count_by_kind(issues: &[Issue]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for issue in issues {
        *counts.entry(issue.kind.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Operation id coverage over a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetric {
    pub operation_count: usize,
    pub operation_id_count: usize,
    pub coverage_percent: f64,
}

impl CoverageMetric {
    /// Coverage is defined as 100 when there are no operations.
    pub fn new(operation_count: usize, operation_id_count: usize) -> Self {
        let coverage_percent = if operation_count > 0 {
            operation_id_count as f64 * 100.0 / operation_count as f64
        } else {
            100.0
        };
        Self {
            operation_count,
            operation_id_count,
            coverage_percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.operation_count == 0 || self.operation_id_count >= self.operation_count
    }
}

impl fmt::Display for CoverageMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} operations carry an operationId ({:.1}%)",
            self.operation_id_count, self.operation_count, self.coverage_percent
        )
    }
}
