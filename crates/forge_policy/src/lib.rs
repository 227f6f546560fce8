//! # forge_policy
//!
//! Release gating and consistency reports built on top of `forge_spec`.
//!
//! This crate provides:
//! - **Enforcement Gate**: assemble, measure coverage, re-run fragment health, fail on any issue
//! - **Version Drift Checker**: catalog versions versus versions quoted in documentation
//! - **Module Topology Reporter**: toolchain/target grouping and capability flags per module
//! - **Reports**: one text/JSON vocabulary for every operation
//! - **Configuration**: `specforge.toml` with defaults for every field
//!
//! Only the gate and the version checker raise errors on findings; every
//! other report is informational.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use forge_policy::{EnforcementGate, ForgeConfig, Report};
//!
//! let root = Path::new(".");
//! let config = ForgeConfig::discover(root, None)?;
//! let gate = EnforcementGate::new(config.spec, config.gate);
//!
//! match gate.enforce(root) {
//!     Ok(evaluation) => println!("{}", Report::from_gate(&evaluation).render_text()),
//!     Err(e) => eprintln!("{}", e),
//! }
//! # Ok::<(), forge_policy::PolicyError>(())
//! ```

pub mod config;
pub mod enforcement;
pub mod error;
pub mod freshness;
pub mod report;
pub mod topology;
pub mod versions;

pub use config::{ForgeConfig, GateConfig, SpecConfig, TopologyConfig, VersionConfig, CONFIG_FILE};
pub use enforcement::{EnforcementGate, GateEvaluation};
pub use error::{PolicyError, PolicyResult};
pub use freshness::SpecFreshness;
pub use report::Report;
pub use topology::{
    load_descriptors, Capability, ModuleDescriptor, ModuleKind, ModuleTopologyReporter,
    TopologyReport,
};
pub use versions::{load_documentation, DocumentationFile, VersionCatalog, VersionDriftChecker};
