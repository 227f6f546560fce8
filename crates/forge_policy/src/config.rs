//! Engine configuration, read from `specforge.toml`.
//!
//! Every field has a default, so a missing file or an empty table yields a
//! usable configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use forge_spec::{FragmentLoader, HeaderConfig, SpecAssembler, DEFAULT_EXTENSIONS};

use crate::error::{PolicyError, PolicyResult};

/// Default configuration file name, looked up in the working root.
pub const CONFIG_FILE: &str = "specforge.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub spec: SpecConfig,
    pub gate: GateConfig,
    pub versions: VersionConfig,
    pub topology: TopologyConfig,
}

impl ForgeConfig {
    /// Parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> PolicyResult<Self> {
        let path = path.as_ref();
        debug!("Reading configuration from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> PolicyResult<Self> {
        let config: ForgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `root/specforge.toml` if present, else defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> PolicyResult<Self> {
        if let Some(path) = explicit {
            return Self::load(resolve(root, path));
        }
        let default_path = root.join(CONFIG_FILE);
        if default_path.is_file() {
            info!("Using configuration {:?}", default_path);
            return Self::load(default_path);
        }
        debug!("No {} found, using built-in defaults", CONFIG_FILE);
        Ok(Self::default())
    }

    fn validate(&self) -> PolicyResult<()> {
        if !(0.0..=100.0).contains(&self.gate.min_coverage) {
            return Err(PolicyError::InvalidConfiguration(format!(
                "gate.min_coverage must be between 0 and 100, got {}",
                self.gate.min_coverage
            )));
        }
        if self.spec.core_schema.trim().is_empty() {
            return Err(PolicyError::InvalidConfiguration(
                "spec.core_schema cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fragment layout and header values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecConfig {
    pub fragments_dir: PathBuf,
    pub core_schema: String,
    pub output: PathBuf,
    pub extensions: Vec<String>,
    pub title: String,
    pub version: String,
    pub server_url: String,
}

impl Default for SpecConfig {
    fn default() -> Self {
        let header = HeaderConfig::default();
        Self {
            fragments_dir: PathBuf::from("api/fragments"),
            core_schema: "core-schema.yml".to_string(),
            output: PathBuf::from("api/unified-api.yml"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            title: header.title,
            version: header.version,
            server_url: header.server_url,
        }
    }
}

impl SpecConfig {
    pub fn loader(&self) -> FragmentLoader {
        FragmentLoader::new(&self.core_schema).with_extensions(self.extensions.clone())
    }

    pub fn assembler(&self) -> SpecAssembler {
        SpecAssembler::new(HeaderConfig {
            title: self.title.clone(),
            version: self.version.clone(),
            server_url: self.server_url.clone(),
        })
    }

    pub fn fragments_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.fragments_dir)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.output)
    }
}

/// Enforcement thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum operation id coverage (percent) of the assembled output.
    pub min_coverage: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { min_coverage: 95.0 }
    }
}

/// Version catalog and documentation inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
    pub catalog: PathBuf,
    /// Documentation files or glob patterns; missing entries are skipped.
    pub docs: Vec<String>,
    /// Words that follow a tool name without being a version.
    pub allow_list: Vec<String>,
    /// Version strings that are always drift.
    pub phantom_versions: Vec<String>,
    /// Extra display names per catalog key, e.g. `agp = ["AGP"]`.
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("gradle/libs.versions.toml"),
            docs: ["README.md", "CHANGELOG.md", "CONTRIBUTING.md", "docs/BUILD.md"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            allow_list: ["Baseline", "alpha", "beta", "rc", "stable", "latest"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            phantom_versions: vec!["0.0.0-phantom".to_string()],
            aliases: BTreeMap::new(),
        }
    }
}

impl VersionConfig {
    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.catalog)
    }
}

/// Module topology inputs and baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub modules_file: PathBuf,
    pub expected_toolchain: String,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            modules_file: PathBuf::from("build/module-descriptors.yaml"),
            expected_toolchain: "24".to_string(),
        }
    }
}

impl TopologyConfig {
    pub fn modules_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.modules_file)
    }
}

/// Join `path` onto `root` unless it is already absolute.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ForgeConfig::from_toml("").unwrap();
        assert_eq!(config, ForgeConfig::default());
        assert_eq!(config.gate.min_coverage, 95.0);
        assert_eq!(config.topology.expected_toolchain, "24");
    }

    #[test]
    fn test_partial_override() {
        let config = ForgeConfig::from_toml(
            r#"
[spec]
fragments_dir = "spec/parts"

[gate]
min_coverage = 80.0

[versions.aliases]
agp = ["AGP"]
"#,
        )
        .unwrap();

        assert_eq!(config.spec.fragments_dir, PathBuf::from("spec/parts"));
        assert_eq!(config.spec.core_schema, "core-schema.yml");
        assert_eq!(config.gate.min_coverage, 80.0);
        assert_eq!(config.versions.aliases["agp"], vec!["AGP".to_string()]);
    }

    #[test]
    fn test_rejects_out_of_range_coverage() {
        let result = ForgeConfig::from_toml("[gate]\nmin_coverage = 120.0\n");
        assert!(matches!(result, Err(PolicyError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_discover_prefers_root_file() {
        let temp = tempdir().unwrap();
        assert_eq!(ForgeConfig::discover(temp.path(), None).unwrap(), ForgeConfig::default());

        fs::write(temp.path().join(CONFIG_FILE), "[topology]\nexpected_toolchain = \"17\"\n").unwrap();
        let config = ForgeConfig::discover(temp.path(), None).unwrap();
        assert_eq!(config.topology.expected_toolchain, "17");
    }
}
