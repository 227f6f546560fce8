//! Line classification for fragment and assembled documents.
//!
//! Every structural decision in this crate goes through these predicates, so
//! replacing them is enough to swap the line-pattern approach for a real
//! document parser.

use std::sync::OnceLock;

use regex::Regex;

/// Indentation of method lines inside a fragment (paths sit at column 0).
pub const FRAGMENT_METHOD_INDENT: usize = 2;

/// Offset applied to every path block line during assembly.
pub const ASSEMBLY_REINDENT: usize = 2;

/// Indentation of method lines inside the assembled document.
pub const ASSEMBLED_METHOD_INDENT: usize = FRAGMENT_METHOD_INDENT + ASSEMBLY_REINDENT;

/// HTTP verbs recognised as method declarations.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Which indentation contract a document follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentLayout {
    Fragment,
    Assembled,
}

impl DocumentLayout {
    pub fn method_indent(&self) -> usize {
        match self {
            DocumentLayout::Fragment => FRAGMENT_METHOD_INDENT,
            DocumentLayout::Assembled => ASSEMBLED_METHOD_INDENT,
        }
    }
}

fn enum_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"enum:\s*\[(.*)\]").expect("enum regex must compile"))
}

fn scheme_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*-\s*([A-Za-z_][A-Za-z0-9_.-]*)\s*:")
            .expect("scheme reference regex must compile")
    })
}

/// Stateless line predicates.
pub struct LineClassifier;

impl LineClassifier {
    /// `/path:` starting at column 0.
    pub fn is_path_line(line: &str) -> bool {
        line.starts_with('/') && line.trim_end().ends_with(':')
    }

    /// Path name declared by a path line, without the trailing colon.
    pub fn path_name(line: &str) -> Option<&str> {
        if !Self::is_path_line(line) {
            return None;
        }
        line.trim_end().strip_suffix(':').map(str::trim_end)
    }

    /// An HTTP verb followed by `:` at exactly `indent` spaces.
    pub fn is_method_line(line: &str, indent: usize) -> bool {
        Self::method_name(line, indent).is_some()
    }

    /// The verb declared by a method line at exactly `indent` spaces.
    pub fn method_name(line: &str, indent: usize) -> Option<&str> {
        let rest = line.get(indent..)?;
        if !line[..indent].bytes().all(|b| b == b' ') {
            return None;
        }
        let (verb, tail) = rest.split_once(':')?;
        if !tail.trim().is_empty() && !tail.trim_start().starts_with('#') {
            return None;
        }
        HTTP_METHODS.iter().copied().find(|m| *m == verb)
    }

    pub fn is_operation_id_line(line: &str) -> bool {
        line.contains("operationId:")
    }

    pub fn is_security_line(line: &str) -> bool {
        line.trim_start().starts_with("security:")
    }

    /// The bracket contents of an `enum: [ ... ]` line.
    pub fn enum_contents(line: &str) -> Option<&str> {
        enum_re()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn is_enum_line(line: &str) -> bool {
        Self::enum_contents(line).is_some()
    }

    /// `components:` at column 0 opens the shared-definitions section.
    pub fn is_components_line(line: &str) -> bool {
        line.trim_end() == "components:"
    }

    pub fn is_security_schemes_line(line: &str) -> bool {
        line.trim() == "securitySchemes:"
    }

    /// Scheme name from a `- name: [...]` requirement entry.
    pub fn scheme_reference(line: &str) -> Option<&str> {
        scheme_reference_re()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Number of leading spaces.
    pub fn indent_of(line: &str) -> usize {
        line.len() - line.trim_start_matches(' ').len()
    }

    pub fn is_blank(line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    }
}
