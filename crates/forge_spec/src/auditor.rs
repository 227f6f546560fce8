//! Structural auditing of fragments and assembled documents.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::classifier::{DocumentLayout, LineClassifier};
use crate::models::{
    CoverageMetric, FragmentFile, Issue, IssueCollector, IssueDetail, IssueKind, Location,
};

fn inline_scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z_][A-Za-z0-9_.-]*)\s*:").expect("inline scheme regex must compile")
    })
}

/// A document handed to the auditor.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub lines: Vec<String>,
    pub layout: DocumentLayout,
}

impl Document {
    pub fn from_fragment(fragment: &FragmentFile) -> Self {
        Self {
            name: fragment.name.clone(),
            lines: fragment.raw_lines.clone(),
            layout: DocumentLayout::Fragment,
        }
    }

    pub fn assembled(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            lines: text.lines().map(str::to_string).collect(),
            layout: DocumentLayout::Assembled,
        }
    }
}

/// Auditor for security schemes, operation id coverage, and enum casing.
pub struct StructuralAuditor;

impl StructuralAuditor {
    /// Audit every document. Never fails.
    pub fn audit(documents: &[Document]) -> IssueCollector {
        let mut issues = IssueCollector::new();
        for document in documents {
            issues.merge(Self::audit_document(document));
        }
        issues
    }

    pub fn audit_document(document: &Document) -> IssueCollector {
        debug!("Auditing {} ({} lines)", document.name, document.lines.len());

        let mut issues = IssueCollector::new();
        issues.merge(Self::check_security_schemes(document));
        issues.merge(Self::check_coverage(document));
        issues.merge(Self::check_enum_casing(document));
        issues
    }

    /// Method and operation id line counts for the document's layout.
    pub fn coverage(document: &Document) -> CoverageMetric {
        Self::coverage_of(&document.lines, document.layout.method_indent())
    }

    pub fn coverage_of(lines: &[String], method_indent: usize) -> CoverageMetric {
        let operations = lines
            .iter()
            .filter(|line| LineClassifier::is_method_line(line, method_indent))
            .count();
        let operation_ids = lines
            .iter()
            .filter(|line| LineClassifier::is_operation_id_line(line))
            .count();
        CoverageMetric::new(operations, operation_ids)
    }

    pub fn check_security_schemes(document: &Document) -> IssueCollector {
        let mut issues = IssueCollector::new();
        let referenced = referenced_schemes(&document.lines);
        if referenced.is_empty() {
            return issues;
        }

        let defined = defined_schemes(&document.lines);
        for (scheme, line) in referenced {
            let missing_reason = match &defined {
                None => "the document has no securitySchemes section",
                Some(names) if !names.contains(&scheme) => "it is not defined under securitySchemes",
                Some(_) => continue,
            };
            issues.add(
                Issue::new(
                    IssueKind::MissingSecurityScheme,
                    Location::new(&document.name, line),
                    format!("Security scheme '{}' is referenced but {}", scheme, missing_reason),
                )
                .with_detail(IssueDetail::SecurityScheme { scheme }),
            );
        }
        issues
    }

    pub fn check_coverage(document: &Document) -> IssueCollector {
        let mut issues = IssueCollector::new();
        let metric = Self::coverage(document);
        if metric.operation_count > 0 && metric.operation_id_count < metric.operation_count {
            issues.add(
                Issue::new(
                    IssueKind::LowOperationIdCoverage,
                    Location::file(&document.name),
                    format!("Only {}", metric),
                )
                .with_detail(IssueDetail::Coverage { metric }),
            );
        }
        issues
    }

    /// Flags enum lists holding both a value with a lowercase letter and a
    /// value with an uppercase letter.
    pub fn check_enum_casing(document: &Document) -> IssueCollector {
        let mut issues = IssueCollector::new();
        for (idx, line) in document.lines.iter().enumerate() {
            let Some(contents) = LineClassifier::enum_contents(line) else {
                continue;
            };
            let values = enum_values(contents);
            let has_lower = values.iter().any(|v| v.chars().any(char::is_lowercase));
            let has_upper = values.iter().any(|v| v.chars().any(char::is_uppercase));
            if has_lower && has_upper {
                issues.add(
                    Issue::new(
                        IssueKind::MixedEnumCasing,
                        Location::new(&document.name, idx + 1),
                        format!("Enum mixes letter casing: {}", values.join(", ")),
                    )
                    .with_detail(IssueDetail::EnumValues { values }),
                );
            }
        }
        issues
    }
}

/// Split `A, 'b', "C"` into its values.
pub fn enum_values(contents: &str) -> Vec<String> {
    contents
        .split(',')
        .map(|v| v.trim().trim_matches(|c: char| c == '[' || c == ']' || c == '"' || c == '\'').trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Scheme names used in `security:` requirements, with their first line.
fn referenced_schemes(lines: &[String]) -> BTreeMap<String, usize> {
    let mut found = BTreeMap::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        idx += 1;
        if !LineClassifier::is_security_line(line) {
            continue;
        }

        let inline = line.trim_start().trim_start_matches("security:").trim();
        if !inline.is_empty() {
            for caps in inline_scheme_re().captures_iter(inline) {
                found.entry(caps[1].to_string()).or_insert(idx);
            }
            continue;
        }

        let security_indent = LineClassifier::indent_of(line);
        let mut item_indent = None;
        while idx < lines.len() {
            let next = &lines[idx];
            if LineClassifier::is_blank(next) {
                idx += 1;
                continue;
            }
            let indent = LineClassifier::indent_of(next);
            let is_item = next.trim_start().starts_with('-');
            if indent < security_indent || (indent == security_indent && !is_item) {
                break;
            }
            if is_item && *item_indent.get_or_insert(indent) == indent {
                if let Some(scheme) = LineClassifier::scheme_reference(next) {
                    found.entry(scheme.to_string()).or_insert(idx + 1);
                }
            }
            idx += 1;
        }
    }

    found
}

/// Names directly under `securitySchemes:`, or `None` without that section.
fn defined_schemes(lines: &[String]) -> Option<BTreeSet<String>> {
    let start = lines
        .iter()
        .position(|line| LineClassifier::is_security_schemes_line(line))?;
    let section_indent = LineClassifier::indent_of(&lines[start]);

    let mut names = BTreeSet::new();
    let mut child_indent = None;
    for line in &lines[start + 1..] {
        if LineClassifier::is_blank(line) {
            continue;
        }
        let indent = LineClassifier::indent_of(line);
        if indent <= section_indent {
            break;
        }
        if *child_indent.get_or_insert(indent) == indent {
            if let Some(name) = line.trim().strip_suffix(':') {
                names.insert(name.to_string());
            }
        }
    }
    Some(names)
}
