//! Integration tests for the enforcement gate and consistency checks.

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use forge_policy::{
    load_descriptors, load_documentation, EnforcementGate, ForgeConfig, GateConfig,
    ModuleTopologyReporter, PolicyError, Report, SpecConfig, VersionCatalog, VersionConfig,
    VersionDriftChecker,
};
use forge_spec::{IssueDetail, IssueKind};

const CORE_SCHEMA: &str = "components:\n  securitySchemes:\n    bearerAuth:\n      type: http\n";

fn operation(path: &str, with_id: bool) -> String {
    let mut text = format!("{}:\n  get:\n", path);
    if with_id {
        text.push_str(&format!("    operationId: get{}\n", path.trim_start_matches('/')));
    }
    text.push_str("    security:\n      - bearerAuth: []\n");
    text
}

fn write_fragments(root: &Path, files: &[(String, String)]) {
    let dir = SpecConfig::default().fragments_dir(root);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("core-schema.yml"), CORE_SCHEMA).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

fn gate() -> EnforcementGate {
    EnforcementGate::new(SpecConfig::default(), GateConfig::default())
}

/// A fully covered fragment set passes and writes the output.
#[test]
fn test_enforce_passes_on_healthy_fragments() {
    let temp = tempdir().unwrap();
    write_fragments(
        temp.path(),
        &[
            ("a.yml".into(), operation("/a", true)),
            ("b.yml".into(), operation("/b", true)),
        ],
    );

    let evaluation = gate().enforce(temp.path()).unwrap();
    assert_eq!(evaluation.coverage.operation_count, 2);
    assert_eq!(evaluation.coverage.coverage_percent, 100.0);
    assert!(fs::read_to_string(&evaluation.output).unwrap().contains("  /b:\n    get:\n"));
}

/// Four of five operations covered: the gate fails at exactly 80%.
#[test]
fn test_enforce_fails_below_threshold() {
    let temp = tempdir().unwrap();
    let files: Vec<_> = ["/a", "/b", "/c", "/d", "/e"]
        .iter()
        .enumerate()
        .map(|(i, path)| (format!("{}.yml", &path[1..]), operation(path, i < 4)))
        .collect();
    write_fragments(temp.path(), &files);

    let err = gate().enforce(temp.path()).unwrap_err();
    let PolicyError::EnforcementViolation(issues) = &err else {
        panic!("expected enforcement violation, got {:?}", err);
    };

    let coverage = issues
        .iter()
        .find(|i| i.kind == IssueKind::LowOperationIdCoverage)
        .expect("coverage issue");
    match &coverage.detail {
        Some(IssueDetail::Coverage { metric }) => assert_eq!(metric.coverage_percent, 80.0),
        other => panic!("unexpected detail: {:?}", other),
    }
    assert!(issues.iter().any(|i| i.kind == IssueKind::MissingOperationId));
    assert!(err.to_string().contains("80.00%"));
}

/// Duplicate paths fail the gate even with full coverage.
#[test]
fn test_enforce_fails_on_duplicate_paths() {
    let temp = tempdir().unwrap();
    write_fragments(
        temp.path(),
        &[
            ("users_a.yml".into(), operation("/users", true)),
            ("users_b.yml".into(), operation("/users", true)),
        ],
    );

    let err = gate().enforce(temp.path()).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].kind, IssueKind::DuplicatePath);
}

/// The gate counts 4-space methods in the output, not 2-space ones.
#[test]
fn test_gate_measures_assembled_indentation() {
    let temp = tempdir().unwrap();
    write_fragments(temp.path(), &[("a.yml".into(), operation("/a", true))]);

    let evaluation = gate().evaluate(temp.path()).unwrap();
    let written = fs::read_to_string(&evaluation.output).unwrap();
    assert!(written.lines().any(|l| l == "    get:"));
    assert!(!written.lines().any(|l| l == "  get:"));
    assert_eq!(evaluation.coverage.operation_count, 1);
}

/// A single mismatched tool version escalates to a drift failure.
#[test]
fn test_version_drift_detected() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("libs.versions.toml"), "[versions]\ntoolX = \"2.0\"\n").unwrap();
    fs::write(temp.path().join("README.md"), "Requires toolX 1.9 or newer.\n").unwrap();

    let config = VersionConfig::default();
    let catalog = VersionCatalog::load(temp.path().join("libs.versions.toml")).unwrap();
    let docs = load_documentation(temp.path(), &config.docs);
    assert_eq!(docs.len(), 1);

    let err = VersionDriftChecker::new(&config)
        .check_versions(&catalog, &docs)
        .unwrap_err();
    let PolicyError::VersionDrift(issues) = err else {
        panic!("expected version drift");
    };
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].location.file, "README.md");
    assert_eq!(
        issues[0].detail,
        Some(IssueDetail::VersionDrift {
            tool: "toolX".into(),
            found: "1.9".into(),
            expected: "2.0".into(),
        })
    );
}

/// Glob entries pick up matching documentation files.
#[test]
fn test_documentation_globs() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("docs")).unwrap();
    fs::write(temp.path().join("docs/one.md"), "toolX 2.0\n").unwrap();
    fs::write(temp.path().join("docs/two.md"), "toolX 2.0\n").unwrap();

    let docs = load_documentation(temp.path(), &["docs/*.md".to_string(), "MISSING.md".to_string()]);
    let names: Vec<_> = docs.iter().map(|d| d.name.replace('\\', "/")).collect();
    assert_eq!(names, vec!["docs/one.md", "docs/two.md"]);

    let catalog = VersionCatalog::parse("toolX = \"2.0\"\n");
    assert!(VersionDriftChecker::new(&VersionConfig::default())
        .check_versions(&catalog, &docs)
        .is_ok());
}

/// Descriptors on disk feed the topology report and its JSON rendering.
#[test]
fn test_topology_report_from_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("modules.json");
    fs::write(
        &path,
        r#"[
  {"name": "app", "kind": "android_app", "toolchain_level": "24", "capabilities": ["ui_toolkit"]},
  {"name": "feature", "kind": "android_library", "toolchain_level": "17"}
]"#,
    )
    .unwrap();

    let config = ForgeConfig::default();
    let modules = load_descriptors(&path).unwrap();
    let topology = ModuleTopologyReporter::new(&config.topology.expected_toolchain).report(&modules);
    let report = Report::from_topology(&topology);

    let value: serde_json::Value = serde_json::from_str(&report.render(true).unwrap()).unwrap();
    assert_eq!(value["counts"]["modules"], 2);
    assert_eq!(value["inconsistentLists"]["inconsistentToolchain"], serde_json::json!(["feature"]));
    assert_eq!(value["inconsistentLists"]["missingUiToolkitInAndroidModules"][0], "feature");
    assert!(report.passed);
}

/// A file matched by both a plain entry and a glob is scanned once.
#[test]
fn test_overlapping_documentation_entries_report_once() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("docs")).unwrap();
    fs::write(temp.path().join("README.md"), "Requires toolX 1.9.\n").unwrap();
    fs::write(temp.path().join("docs/BUILD.md"), "Build notes.\n").unwrap();

    let entries = ["README.md", "docs/BUILD.md", "*.md"].map(String::from);
    let docs = load_documentation(temp.path(), &entries);
    let names: Vec<_> = docs.iter().map(|d| d.name.replace('\\', "/")).collect();
    assert_eq!(names, vec!["README.md", "docs/BUILD.md"]);

    let catalog = VersionCatalog::parse("toolX = \"2.0\"\n");
    let err = VersionDriftChecker::new(&VersionConfig::default())
        .check_versions(&catalog, &docs)
        .unwrap_err();
    assert_eq!(err.issues().len(), 1);
}
