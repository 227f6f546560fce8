//! Version drift between the version catalog and prose documentation.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use forge_spec::{Issue, IssueCollector, IssueDetail, IssueKind, Location, SpecError};

use crate::config::VersionConfig;
use crate::error::{PolicyError, PolicyResult};

fn catalog_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*([A-Za-z0-9_.-]+)\s*=\s*"([^"]*)"\s*(?:#.*)?$"#)
            .expect("catalog entry regex must compile")
    })
}

/// Expected versions keyed by tool name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalog {
    versions: BTreeMap<String, String>,
}

impl VersionCatalog {
    pub fn load(path: impl AsRef<Path>) -> PolicyResult<Self> {
        let path = path.as_ref();
        debug!("Reading version catalog {:?}", path);
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Collect every `key = "value"` line; other lines are ignored.
    pub fn parse(content: &str) -> Self {
        let versions = content
            .lines()
            .filter_map(|line| catalog_entry_re().captures(line))
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect();
        Self { versions }
    }

    pub fn get(&self, tool: &str) -> Option<&str> {
        self.versions.get(tool).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.versions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A documentation file to scan.
#[derive(Debug, Clone)]
pub struct DocumentationFile {
    pub name: String,
    pub content: String,
}

impl DocumentationFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Read the configured documentation entries that exist under `root`.
///
/// Entries may be plain paths or glob patterns. A file matched by several
/// entries is read once; files come back in path order.
pub fn load_documentation(root: &Path, entries: &[String]) -> Vec<DocumentationFile> {
    let mut paths: BTreeSet<PathBuf> = BTreeSet::new();
    for entry in entries {
        if entry.contains(['*', '?', '[']) {
            let pattern = root.join(entry).to_string_lossy().to_string();
            match glob::glob(&pattern) {
                Ok(matches) => paths.extend(matches.filter_map(|m| m.ok()).filter(|p| p.is_file())),
                Err(e) => warn!("Ignoring invalid documentation pattern {}: {}", entry, e),
            }
        } else {
            let path = root.join(entry);
            if path.is_file() {
                paths.insert(path);
            } else {
                debug!("Documentation file {:?} not present, skipping", path);
            }
        }
    }

    paths
        .into_iter()
        .filter_map(|path| match fs::read_to_string(&path) {
            Ok(content) => {
                let name = path.strip_prefix(root).unwrap_or(&path).display().to_string();
                Some(DocumentationFile::new(name, content))
            }
            Err(e) => {
                warn!("Skipping unreadable documentation file {:?}: {}", path, e);
                None
            }
        })
        .collect()
}

/// Checker comparing documented versions against the catalog.
pub struct VersionDriftChecker {
    allow_list: Vec<String>,
    phantom_versions: Vec<String>,
    aliases: BTreeMap<String, Vec<String>>,
}

impl VersionDriftChecker {
    pub fn new(config: &VersionConfig) -> Self {
        Self {
            allow_list: config.allow_list.clone(),
            phantom_versions: config.phantom_versions.clone(),
            aliases: config.aliases.clone(),
        }
    }

    /// Scan and escalate: any drift fails with [`PolicyError::VersionDrift`].
    pub fn check_versions(
        &self,
        catalog: &VersionCatalog,
        docs: &[DocumentationFile],
    ) -> PolicyResult<()> {
        let issues = self.scan(catalog, docs)?;
        if issues.is_empty() {
            info!(
                "No version drift across {} documentation files ({} catalog entries)",
                docs.len(),
                catalog.len()
            );
            Ok(())
        } else {
            Err(PolicyError::VersionDrift(issues.into_issues()))
        }
    }

    /// Collect every drift without failing.
    pub fn scan(
        &self,
        catalog: &VersionCatalog,
        docs: &[DocumentationFile],
    ) -> PolicyResult<IssueCollector> {
        let mut issues = IssueCollector::new();

        for (tool, expected) in catalog.iter() {
            let patterns = self.tool_patterns(tool)?;
            for doc in docs {
                for (idx, line) in doc.content.lines().enumerate() {
                    for pattern in &patterns {
                        for caps in pattern.captures_iter(line) {
                            let found = caps[1].trim_end_matches(['.', ',', ';', ':', ')']);
                            if self.is_drift(found, expected) {
                                issues.add(drift_issue(&doc.name, idx + 1, tool, found, expected));
                            }
                        }
                    }
                }
            }
        }

        Ok(issues)
    }

    fn is_drift(&self, found: &str, expected: &str) -> bool {
        if self.phantom_versions.iter().any(|p| p == found) {
            return true;
        }
        if self.allow_list.iter().any(|w| w.eq_ignore_ascii_case(found)) {
            return false;
        }
        if !found.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        found != expected
    }

    /// `<Name> <token>` matchers for the tool and its aliases.
    fn tool_patterns(&self, tool: &str) -> PolicyResult<Vec<Regex>> {
        let mut names = vec![tool.to_string()];
        if let Some(aliases) = self.aliases.get(tool) {
            names.extend(aliases.iter().cloned());
        }

        names
            .iter()
            .map(|name| {
                let pattern = format!(
                    r"(?i)(?:^|[^A-Za-z0-9_.-]){}\s+v?([A-Za-z0-9][A-Za-z0-9._+-]*)",
                    regex::escape(name)
                );
                Regex::new(&pattern).map_err(|e| {
                    PolicyError::Spec(SpecError::InvalidPattern(format!("tool name '{}': {}", name, e)))
                })
            })
            .collect()
    }
}

fn drift_issue(file: &str, line: usize, tool: &str, found: &str, expected: &str) -> Issue {
    Issue::new(
        IssueKind::VersionDrift,
        Location::new(file, line),
        format!("{} is documented as {} but the catalog declares {}", tool, found, expected),
    )
    .with_detail(IssueDetail::VersionDrift {
        tool: tool.to_string(),
        found: found.to_string(),
        expected: expected.to_string(),
    })
}
