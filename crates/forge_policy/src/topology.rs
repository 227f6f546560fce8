//! Module topology health across build modules.
//!
//! Module descriptors are supplied by the surrounding build; this module only
//! depends on the [`ModuleDescriptor`] record.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PolicyResult;

/// Kind of build module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    AndroidApp,
    AndroidLibrary,
    JvmLibrary,
    #[default]
    Other,
}

impl ModuleKind {
    pub fn is_android(&self) -> bool {
        matches!(self, ModuleKind::AndroidApp | ModuleKind::AndroidLibrary)
    }
}

/// Capability flags a module may enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    DependencyInjection,
    AnnotationProcessing,
    UiToolkit,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::DependencyInjection,
        Capability::AnnotationProcessing,
        Capability::UiToolkit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::DependencyInjection => "dependency_injection",
            Capability::AnnotationProcessing => "annotation_processing",
            Capability::UiToolkit => "ui_toolkit",
        }
    }
}

/// Summary of one build module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    #[serde(default)]
    pub kind: ModuleKind,
    #[serde(default)]
    pub toolchain_level: Option<String>,
    #[serde(default)]
    pub target_level: Option<String>,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            toolchain_level: None,
            target_level: None,
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_toolchain(mut self, level: impl Into<String>) -> Self {
        self.toolchain_level = Some(level.into());
        self
    }

    pub fn with_target(mut self, level: impl Into<String>) -> Self {
        self.target_level = Some(level.into());
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Read descriptors from a YAML or JSON list.
pub fn load_descriptors(path: impl AsRef<Path>) -> PolicyResult<Vec<ModuleDescriptor>> {
    let path = path.as_ref();
    debug!("Reading module descriptors from {:?}", path);
    let content = fs::read_to_string(path)?;
    let modules: Vec<ModuleDescriptor> = serde_yaml::from_str(&content)?;
    Ok(modules)
}

/// Informational topology report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyReport {
    pub module_count: usize,
    pub expected_toolchain: String,
    pub toolchain_levels: BTreeMap<String, usize>,
    pub target_levels: BTreeMap<String, usize>,
    pub inconsistent_toolchain: Vec<String>,
    pub missing_ui_toolkit_in_android_modules: Vec<String>,
    pub capability_counts: BTreeMap<String, usize>,
}

/// Reporter grouping modules by toolchain, target, and capabilities.
pub struct ModuleTopologyReporter {
    expected_toolchain: String,
}

impl ModuleTopologyReporter {
    pub fn new(expected_toolchain: impl Into<String>) -> Self {
        Self {
            expected_toolchain: expected_toolchain.into(),
        }
    }

    /// Build the report. Never fails.
    pub fn report(&self, modules: &[ModuleDescriptor]) -> TopologyReport {
        let mut report = TopologyReport {
            module_count: modules.len(),
            expected_toolchain: self.expected_toolchain.clone(),
            ..Default::default()
        };

        for capability in Capability::ALL {
            report.capability_counts.insert(capability.as_str().to_string(), 0);
        }

        for module in modules {
            if let Some(level) = &module.toolchain_level {
                *report.toolchain_levels.entry(level.clone()).or_insert(0) += 1;
                if *level != self.expected_toolchain {
                    report.inconsistent_toolchain.push(module.name.clone());
                }
            }
            if let Some(level) = &module.target_level {
                *report.target_levels.entry(level.clone()).or_insert(0) += 1;
            }
            if module.kind.is_android() && !module.has(Capability::UiToolkit) {
                report.missing_ui_toolkit_in_android_modules.push(module.name.clone());
            }
            for capability in &module.capabilities {
                *report
                    .capability_counts
                    .entry(capability.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        info!(
            "Module topology: {} modules, {} off toolchain {}, {} Android modules without UI toolkit",
            report.module_count,
            report.inconsistent_toolchain.len(),
            self.expected_toolchain,
            report.missing_ui_toolkit_in_android_modules.len()
        );
        report
    }
}
