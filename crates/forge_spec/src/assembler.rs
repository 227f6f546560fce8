//! Merging fragments into the unified document.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{LineClassifier, ASSEMBLY_REINDENT};
use crate::error::{SpecError, SpecResult};
use crate::loader::FragmentSet;
use crate::models::{AssembledSpec, FragmentFile, SpecHeader};

/// Header key carrying the generation timestamp.
pub const GENERATED_AT_KEY: &str = "x-generated-at";

/// OpenAPI version written into the unified document.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Static header values for the unified document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    pub title: String,
    pub version: String,
    pub server_url: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            title: "Unified API".to_string(),
            version: "1.0.0".to_string(),
            server_url: "https://api.example.com/v1".to_string(),
        }
    }
}

/// Assembler for the unified document.
#[derive(Debug, Clone, Default)]
pub struct SpecAssembler {
    header: HeaderConfig,
}

impl SpecAssembler {
    pub fn new(header: HeaderConfig) -> Self {
        Self { header }
    }

    /// Assemble the fragment set, stamping it with the current time.
    pub fn assemble(&self, set: &FragmentSet) -> SpecResult<AssembledSpec> {
        self.assemble_at(set, Utc::now())
    }

    /// Assemble the fragment set with an explicit generation timestamp.
    pub fn assemble_at(
        &self,
        set: &FragmentSet,
        generated_at: DateTime<Utc>,
    ) -> SpecResult<AssembledSpec> {
        let components_block = set
            .core_schema
            .as_ref()
            .and_then(Self::components_block)
            .ok_or_else(|| SpecError::MissingCoreSchema(set.core_schema_path.clone()))?;

        let mut seen_paths = BTreeSet::new();
        let mut ordered_path_blocks = Vec::new();
        for fragment in &set.fragments {
            match Self::path_block(fragment, &mut seen_paths) {
                Some(block) => ordered_path_blocks.push(block),
                None => debug!("Fragment {} declares no paths, skipping", fragment.name),
            }
        }

        info!(
            "Assembled {} path blocks with components from {:?}",
            ordered_path_blocks.len(),
            set.core_schema_path
        );

        Ok(AssembledSpec {
            header: SpecHeader {
                title: self.header.title.clone(),
                version: self.header.version.clone(),
                generated_at,
                server_url: self.header.server_url.clone(),
            },
            ordered_path_blocks,
            components_block,
        })
    }

    /// Assemble and write the rendering to `output`, replacing its content.
    pub fn assemble_to(&self, set: &FragmentSet, output: impl AsRef<Path>) -> SpecResult<AssembledSpec> {
        let spec = self.assemble(set)?;
        Self::write(&spec, output)?;
        Ok(spec)
    }

    pub fn write(spec: &AssembledSpec, output: impl AsRef<Path>) -> SpecResult<()> {
        let output = output.as_ref();
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output, spec.render())?;
        info!("Wrote unified spec to {:?}", output);
        Ok(())
    }

    /// The `components:` line of the core schema and everything after it.
    fn components_block(core: &FragmentFile) -> Option<String> {
        let start = core
            .raw_lines
            .iter()
            .position(|line| LineClassifier::is_components_line(line))?;

        let mut block = core.raw_lines[start..].join("\n");
        block.push('\n');
        Some(block)
    }

    /// Everything from the first path line on, re-indented.
    ///
    /// Paths already claimed by an earlier fragment are dropped together with
    /// their methods; the first declaration wins.
    fn path_block(fragment: &FragmentFile, seen_paths: &mut BTreeSet<String>) -> Option<String> {
        let start = fragment
            .raw_lines
            .iter()
            .position(|line| LineClassifier::is_path_line(line))?;

        let pad = " ".repeat(ASSEMBLY_REINDENT);
        let mut block = String::new();
        let mut skipping = false;

        for line in &fragment.raw_lines[start..] {
            if let Some(path) = LineClassifier::path_name(line) {
                skipping = !seen_paths.insert(path.to_string());
                if skipping {
                    debug!("Dropping duplicate path {} from {}", path, fragment.name);
                }
            }
            if skipping {
                continue;
            }
            if !line.trim().is_empty() {
                block.push_str(&pad);
                block.push_str(line);
            }
            block.push('\n');
        }

        Some(block)
    }
}

impl AssembledSpec {
    /// Textual rendering of the unified document.
    pub fn render(&self) -> String {
        let generated_at = self
            .header
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut out = String::new();
        out.push_str("# Generated by specforge. Do not edit by hand.\n");
        out.push_str(&format!("openapi: {}\n", OPENAPI_VERSION));
        out.push_str("info:\n");
        out.push_str(&format!("  title: {}\n", self.header.title));
        out.push_str(&format!("  version: {}\n", self.header.version));
        out.push_str(&format!("  {}: '{}'\n", GENERATED_AT_KEY, generated_at));
        out.push_str("servers:\n");
        out.push_str(&format!("  - url: {}\n", self.header.server_url));
        out.push_str("paths:\n");
        for block in &self.ordered_path_blocks {
            out.push_str(block);
        }
        out.push_str(&self.components_block);
        out
    }
}
