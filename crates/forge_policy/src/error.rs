//! Error types for policy module.

use std::fmt::Write as _;

use forge_spec::{Issue, SpecError};
use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur during policy operations.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("Enforcement violation: {} issue(s)\n{}", .0.len(), list_issues(.0))]
    EnforcementViolation(Vec<Issue>),

    #[error("Version drift detected: {} issue(s)\n{}", .0.len(), list_issues(.0))]
    VersionDrift(Vec<Issue>),

    #[error("Invalid policy configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PolicyError {
    /// Issues carried by a violation, empty for other variants.
    pub fn issues(&self) -> &[Issue] {
        match self {
            PolicyError::EnforcementViolation(issues) | PolicyError::VersionDrift(issues) => issues,
            _ => &[],
        }
    }
}

fn list_issues(issues: &[Issue]) -> String {
    let mut out = String::new();
    for issue in issues {
        let _ = writeln!(out, "  - {}", issue);
    }
    out.trim_end().to_string()
}
