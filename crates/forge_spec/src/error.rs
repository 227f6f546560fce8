//! Error types for the spec module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur during spec operations.
///
/// Only hard preconditions live here. Structural findings are reported as
/// [`Issue`](crate::models::Issue) values instead.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Fragments directory not found: {0}")]
    MissingFragmentsDirectory(PathBuf),

    #[error("Core schema {0} is missing or defines no `components:` section")]
    MissingCoreSchema(PathBuf),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
