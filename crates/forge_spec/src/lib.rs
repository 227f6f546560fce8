//! # forge_spec
//!
//! Loading, assembly, and structural auditing of API description fragments.
//!
//! A fragments directory holds many small documents, each declaring a handful
//! of paths, plus one core schema that owns the shared `components:` section.
//! This crate merges them into one unified document and reports structural
//! problems along the way.
//!
//! ## Components
//!
//! - **Line Classifier**: pure predicates over single lines ([`LineClassifier`])
//! - **Fragment Loader**: sorted discovery of fragment files ([`FragmentLoader`])
//! - **Spec Assembler**: path blocks + core components into one document ([`SpecAssembler`])
//! - **Structural Auditor**: security schemes, coverage, enum casing ([`StructuralAuditor`])
//! - **Fragment Health Analyzer**: duplicate paths, missing method metadata ([`FragmentHealthAnalyzer`])
//!
//! ## Indentation contract
//!
//! Fragments put paths at column 0 and methods at
//! [`FRAGMENT_METHOD_INDENT`] spaces. Assembly shifts path blocks right by
//! [`ASSEMBLY_REINDENT`], so the unified document has methods at
//! [`ASSEMBLED_METHOD_INDENT`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use forge_spec::{FragmentHealthAnalyzer, FragmentLoader, SpecAssembler};
//!
//! let set = FragmentLoader::new("core-schema.yml").load("api/fragments").unwrap();
//! SpecAssembler::default().assemble_to(&set, "api/unified-api.yml").unwrap();
//!
//! for issue in FragmentHealthAnalyzer::new().analyze(&set.fragments).issues() {
//!     eprintln!("{}", issue);
//! }
//! ```

pub mod assembler;
pub mod auditor;
pub mod classifier;
pub mod error;
pub mod health;
pub mod loader;
pub mod models;

pub use assembler::{HeaderConfig, SpecAssembler, GENERATED_AT_KEY};
pub use auditor::{Document, StructuralAuditor};
pub use classifier::{
    DocumentLayout, LineClassifier, ASSEMBLED_METHOD_INDENT, ASSEMBLY_REINDENT,
    FRAGMENT_METHOD_INDENT,
};
pub use error::{SpecError, SpecResult};
pub use health::{FragmentHealthAnalyzer, FragmentScan};
pub use loader::{FragmentLoader, FragmentSet, DEFAULT_EXTENSIONS};
pub use models::*;
