//! Fragment discovery and reading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{SpecError, SpecResult};
use crate::models::FragmentFile;

/// Extensions recognised as spec fragments when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["yml", "yaml", "frag"];

/// Fragments found in one directory, with the core schema kept apart.
#[derive(Debug, Clone)]
pub struct FragmentSet {
    pub directory: PathBuf,
    /// Non-core fragments sorted by file name.
    pub fragments: Vec<FragmentFile>,
    pub core_schema: Option<FragmentFile>,
    /// Where the core schema is expected, whether or not it exists.
    pub core_schema_path: PathBuf,
}

impl FragmentSet {
    /// Every file in the set, core schema last.
    pub fn all_files(&self) -> impl Iterator<Item = &FragmentFile> {
        self.fragments.iter().chain(self.core_schema.iter())
    }
}

/// Loader for a fragments directory.
#[derive(Debug, Clone)]
pub struct FragmentLoader {
    core_schema_name: String,
    extensions: Vec<String>,
}

impl FragmentLoader {
    pub fn new(core_schema_name: impl Into<String>) -> Self {
        Self {
            core_schema_name: core_schema_name.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn core_schema_name(&self) -> &str {
        &self.core_schema_name
    }

    /// Read every fragment in `directory`.
    ///
    /// Fails with [`SpecError::MissingFragmentsDirectory`] when the directory
    /// does not exist; callers decide whether that is fatal.
    pub fn load(&self, directory: impl AsRef<Path>) -> SpecResult<FragmentSet> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(SpecError::MissingFragmentsDirectory(directory.to_path_buf()));
        }

        let mut fragments = Vec::new();
        let mut core_schema = None;

        for entry in WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !self.has_fragment_extension(path) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let content = fs::read_to_string(path)?;
            debug!("Read fragment {} ({} bytes)", name, content.len());

            if name == self.core_schema_name {
                core_schema = Some(FragmentFile::new(name, &content));
            } else {
                fragments.push(FragmentFile::new(name, &content));
            }
        }

        info!(
            "Loaded {} fragments from {:?} (core schema {})",
            fragments.len(),
            directory,
            if core_schema.is_some() { "present" } else { "absent" }
        );

        Ok(FragmentSet {
            directory: directory.to_path_buf(),
            fragments,
            core_schema,
            core_schema_path: directory.join(&self.core_schema_name),
        })
    }

    /// Like [`load`](Self::load), but a missing directory yields an empty set.
    pub fn load_or_empty(&self, directory: impl AsRef<Path>) -> SpecResult<FragmentSet> {
        match self.load(directory.as_ref()) {
            Err(SpecError::MissingFragmentsDirectory(dir)) => {
                debug!("Fragments directory {:?} not found, nothing to scan", dir);
                let core_schema_path = dir.join(&self.core_schema_name);
                Ok(FragmentSet {
                    directory: dir,
                    fragments: Vec::new(),
                    core_schema: None,
                    core_schema_path,
                })
            }
            other => other,
        }
    }

    fn has_fragment_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy())
            .map_or(false, |ext| self.extensions.iter().any(|e| *e == ext))
    }
}
