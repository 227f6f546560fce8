//! Per-fragment health: duplicate paths and missing method metadata.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::classifier::{LineClassifier, FRAGMENT_METHOD_INDENT};
use crate::models::{
    FragmentFile, Issue, IssueCollector, IssueDetail, IssueKind, Location, MethodEntry, PathEntry,
};

/// Scanner position inside a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    NoPath,
    HasPath(PathEntry),
    HasPathAndMethod(PathEntry, MethodEntry),
}

/// Result of scanning a single fragment.
#[derive(Debug, Clone, Default)]
pub struct FragmentScan {
    pub paths: Vec<PathEntry>,
    pub issues: IssueCollector,
}

/// Analyzer for duplicate paths and missing operation metadata.
#[derive(Debug, Clone, Copy)]
pub struct FragmentHealthAnalyzer {
    method_indent: usize,
}

impl Default for FragmentHealthAnalyzer {
    fn default() -> Self {
        Self {
            method_indent: FRAGMENT_METHOD_INDENT,
        }
    }
}

impl FragmentHealthAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run both checks over all fragments. Never fails.
    pub fn analyze(&self, fragments: &[FragmentFile]) -> IssueCollector {
        let mut issues = self.missing_metadata(fragments);
        issues.merge(self.duplicate_paths(fragments));
        issues
    }

    /// `MissingOperationId` / `MissingSecurity` for every incomplete method.
    pub fn missing_metadata(&self, fragments: &[FragmentFile]) -> IssueCollector {
        let mut issues = IssueCollector::new();
        for fragment in fragments {
            issues.merge(self.scan(fragment).issues);
        }
        issues
    }

    /// One `DuplicatePath` per path declared in more than one file.
    pub fn duplicate_paths(&self, fragments: &[FragmentFile]) -> IssueCollector {
        let mut declared: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for fragment in fragments {
            for entry in self.scan(fragment).paths {
                declared
                    .entry(entry.path)
                    .or_default()
                    .entry(fragment.name.clone())
                    .or_insert(entry.line);
            }
        }

        let mut issues = IssueCollector::new();
        for (path, files) in declared {
            if files.len() < 2 {
                continue;
            }
            let (first_file, first_line) = files
                .iter()
                .next()
                .map(|(file, line)| (file.clone(), *line))
                .unwrap_or_default();
            let names: BTreeSet<String> = files.into_keys().collect();
            issues.add(
                Issue::new(
                    IssueKind::DuplicatePath,
                    Location::new(first_file, first_line),
                    format!(
                        "Path {} is declared in multiple fragments: {}",
                        path,
                        names.iter().cloned().collect::<Vec<_>>().join(", ")
                    ),
                )
                .with_detail(IssueDetail::DuplicatePath { path, files: names }),
            );
        }
        issues
    }

    /// Walk one fragment through the path/method state machine.
    pub fn scan(&self, fragment: &FragmentFile) -> FragmentScan {
        let mut scan = FragmentScan::default();
        let mut state = ScanState::NoPath;

        for (idx, line) in fragment.raw_lines.iter().enumerate() {
            let line_no = idx + 1;

            if let Some(path) = LineClassifier::path_name(line) {
                Self::close_path(state, fragment, &mut scan);
                state = ScanState::HasPath(PathEntry {
                    path: path.to_string(),
                    line: line_no,
                    methods: Vec::new(),
                });
                continue;
            }

            if let Some(method) = LineClassifier::method_name(line, self.method_indent) {
                state = match state {
                    ScanState::NoPath => {
                        debug!("{}:{} method {} outside any path", fragment.name, line_no, method);
                        ScanState::NoPath
                    }
                    ScanState::HasPath(entry) => {
                        ScanState::HasPathAndMethod(entry, MethodEntry::new(method, line_no))
                    }
                    ScanState::HasPathAndMethod(mut entry, previous) => {
                        Self::close_method(&entry, previous.clone(), fragment, &mut scan.issues);
                        entry.methods.push(previous);
                        ScanState::HasPathAndMethod(entry, MethodEntry::new(method, line_no))
                    }
                };
                continue;
            }

            if let ScanState::HasPathAndMethod(_, method) = &mut state {
                if LineClassifier::is_operation_id_line(line) {
                    method.has_operation_id = true;
                }
                if LineClassifier::is_security_line(line) {
                    method.has_security = true;
                }
            }
        }

        Self::close_path(state, fragment, &mut scan);
        scan
    }

    fn close_path(state: ScanState, fragment: &FragmentFile, scan: &mut FragmentScan) {
        match state {
            ScanState::NoPath => {}
            ScanState::HasPath(entry) => scan.paths.push(entry),
            ScanState::HasPathAndMethod(mut entry, method) => {
                Self::close_method(&entry, method.clone(), fragment, &mut scan.issues);
                entry.methods.push(method);
                scan.paths.push(entry);
            }
        }
    }

    fn close_method(
        path: &PathEntry,
        method: MethodEntry,
        fragment: &FragmentFile,
        issues: &mut IssueCollector,
    ) {
        let location = Location::new(&fragment.name, method.line);
        let detail = IssueDetail::Operation {
            path: path.path.clone(),
            method: method.method.clone(),
        };

        if !method.has_operation_id {
            issues.add(
                Issue::new(
                    IssueKind::MissingOperationId,
                    location.clone(),
                    format!("{} {} has no operationId", method.method.to_uppercase(), path.path),
                )
                .with_detail(detail.clone()),
            );
        }
        if !method.has_security {
            issues.add(
                Issue::new(
                    IssueKind::MissingSecurity,
                    location,
                    format!("{} {} declares no security", method.method.to_uppercase(), path.path),
                )
                .with_detail(detail),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_method_is_healthy() {
        let fragment = FragmentFile::new(
            "items.yml",
            "/items:\n  get:\n    operationId: listItems\n    security:\n      - bearerAuth: []\n",
        );
        let scan = FragmentHealthAnalyzer::new().scan(&fragment);
        assert!(scan.issues.is_empty());
        assert_eq!(scan.paths.len(), 1);
        assert_eq!(scan.paths[0].methods[0].method, "get");
        assert!(scan.paths[0].methods[0].has_security);
    }

    #[test]
    fn test_flags_reset_per_method() {
        let fragment = FragmentFile::new(
            "items.yml",
            "/items:\n  get:\n    operationId: listItems\n    security: []\n  post:\n/other:\n  put:\n    operationId: put\n",
        );
        let issues = FragmentHealthAnalyzer::new().missing_metadata(&[fragment]).into_issues();
        let kinds: Vec<_> = issues.iter().map(|i| (i.kind, i.location.line)).collect();
        assert_eq!(
            kinds,
            vec![
                (IssueKind::MissingOperationId, 5),
                (IssueKind::MissingSecurity, 5),
                (IssueKind::MissingSecurity, 7),
            ]
        );
    }

    #[test]
    fn test_method_outside_path_is_ignored() {
        let fragment = FragmentFile::new("loose.yml", "  get:\n    summary: x\n");
        assert!(FragmentHealthAnalyzer::new().analyze(&[fragment]).is_empty());
    }

    #[test]
    fn test_over_indented_method_is_not_a_method() {
        let fragment = FragmentFile::new("deep.yml", "/deep:\n    get:\n");
        let scan = FragmentHealthAnalyzer::new().scan(&fragment);
        assert!(scan.issues.is_empty());
        assert!(scan.paths[0].methods.is_empty());
    }

    #[test]
    fn test_same_file_redeclaration_is_not_duplicate() {
        let fragment = FragmentFile::new("one.yml", "/a:\n/a:\n");
        assert!(FragmentHealthAnalyzer::new().duplicate_paths(&[fragment]).is_empty());
    }
}
