//! Integration tests for fragment loading, assembly, and analysis.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use forge_spec::{
    Document, FragmentHealthAnalyzer, FragmentLoader, IssueDetail, IssueKind, SpecAssembler,
    StructuralAuditor, GENERATED_AT_KEY,
};

const CORE: &str = "core-schema.yml";

const CORE_SCHEMA: &str = r#"openapi: 3.0.3
info:
  title: Core
components:
  securitySchemes:
    bearerAuth:
      type: http
      scheme: bearer
  schemas:
    Item:
      type: object
      properties:
        status:
          type: string
          enum: [ACTIVE, INACTIVE]
"#;

const ITEMS: &str = r#"# Items API
/items:
  get:
    operationId: listItems
    security:
      - bearerAuth: []
    responses:
      '200':
        description: OK
"#;

fn write_fragments(dir: &Path, files: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

/// Single healthy fragment assembles, audits clean, and has full coverage.
#[test]
fn test_single_fragment_round_trip() {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("fragments");
    write_fragments(&dir, &[("items.frag", ITEMS), (CORE, CORE_SCHEMA)]);

    let set = FragmentLoader::new(CORE).load(&dir).unwrap();
    let output = temp.path().join("out/unified.yml");
    SpecAssembler::default().assemble_to(&set, &output).unwrap();

    let rendered = fs::read_to_string(&output).unwrap();
    let document = Document::assembled("unified.yml", &rendered);
    let issues = StructuralAuditor::audit(&[document.clone()]);
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);

    let metric = StructuralAuditor::coverage(&document);
    assert_eq!(metric.operation_count, 1);
    assert_eq!(metric.coverage_percent, 100.0);

    assert!(FragmentHealthAnalyzer::new().analyze(&set.fragments).is_empty());
}

/// Two fragments declaring the same path produce one duplicate issue.
#[test]
fn test_duplicate_path_names_both_files() {
    let temp = tempdir().unwrap();
    let users = "/users:\n  get:\n    operationId: listUsers\n    security: []\n";
    write_fragments(
        temp.path(),
        &[("users_a.frag", users), ("users_b.frag", users), (CORE, CORE_SCHEMA)],
    );

    let set = FragmentLoader::new(CORE).load(temp.path()).unwrap();
    let issues = FragmentHealthAnalyzer::new().analyze(&set.fragments).into_issues();

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::DuplicatePath);
    match &issues[0].detail {
        Some(IssueDetail::DuplicatePath { path, files }) => {
            assert_eq!(path, "/users");
            let files: Vec<_> = files.iter().map(String::as_str).collect();
            assert_eq!(files, vec!["users_a.frag", "users_b.frag"]);
        }
        other => panic!("unexpected detail: {:?}", other),
    }
}

/// The duplicate file set does not depend on load order.
#[test]
fn test_duplicate_detection_is_order_independent() {
    let a = forge_spec::FragmentFile::new("a.yml", "/p:\n");
    let b = forge_spec::FragmentFile::new("b.yml", "/p:\n");
    let analyzer = FragmentHealthAnalyzer::new();

    let forward = analyzer.duplicate_paths(&[a.clone(), b.clone()]).into_issues();
    let backward = analyzer.duplicate_paths(&[b, a]).into_issues();
    assert_eq!(forward[0].detail, backward[0].detail);
}

/// A bare method yields exactly a missing operationId and a missing security.
#[test]
fn test_bare_method_reports_both_gaps() {
    let temp = tempdir().unwrap();
    write_fragments(
        temp.path(),
        &[("bare.yml", "/bare:\n  get:\n    summary: nothing here\n")],
    );

    let set = FragmentLoader::new(CORE).load(temp.path()).unwrap();
    let issues = FragmentHealthAnalyzer::new().analyze(&set.fragments).into_issues();

    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].kind, IssueKind::MissingOperationId);
    assert_eq!(issues[1].kind, IssueKind::MissingSecurity);
    assert_eq!(issues[0].location, issues[1].location);
    assert_eq!(issues[0].detail, issues[1].detail);
    assert_eq!(
        issues[0].detail,
        Some(IssueDetail::Operation {
            path: "/bare".into(),
            method: "get".into()
        })
    );
}

/// Mixed casing in an enum list is reported once with every value.
#[test]
fn test_mixed_enum_casing_in_fragment() {
    let fragment = forge_spec::FragmentFile::new(
        "status.yml",
        "/status:\n  get:\n    parameters:\n      - name: state\n        schema:\n          enum: [Active, pending, INACTIVE]\n",
    );
    let issues = StructuralAuditor::check_enum_casing(&Document::from_fragment(&fragment)).into_issues();

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::MixedEnumCasing);
    assert!(issues[0].message.contains("Active, pending, INACTIVE"));
}

/// Assembling twice differs only in the generation timestamp.
#[test]
fn test_assembly_is_idempotent() {
    let temp = tempdir().unwrap();
    write_fragments(
        temp.path(),
        &[
            ("b.yml", "/b:\n  get:\n    operationId: b\n"),
            ("a.yml", "/a:\n  post:\n    operationId: a\n"),
            (CORE, CORE_SCHEMA),
        ],
    );

    let loader = FragmentLoader::new(CORE);
    let assembler = SpecAssembler::default();
    let first = assembler
        .assemble_at(&loader.load(temp.path()).unwrap(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .unwrap()
        .render();
    let second = assembler
        .assemble_at(&loader.load(temp.path()).unwrap(), Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap())
        .unwrap()
        .render();

    assert_ne!(first, second);
    let strip = |text: &str| {
        text.lines()
            .filter(|line| !line.contains(GENERATED_AT_KEY))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip(&first), strip(&second));
    assert!(first.find("  /a:").unwrap() < first.find("  /b:").unwrap());
}

/// The components section is copied byte for byte.
#[test]
fn test_components_pass_through() {
    let temp = tempdir().unwrap();
    write_fragments(temp.path(), &[("a.yml", "/a:\n"), (CORE, CORE_SCHEMA)]);

    let set = FragmentLoader::new(CORE).load(temp.path()).unwrap();
    let spec = SpecAssembler::default().assemble(&set).unwrap();

    let expected = &CORE_SCHEMA[CORE_SCHEMA.find("components:").unwrap()..];
    assert_eq!(spec.components_block, expected);
    assert!(spec.render().ends_with(expected));
}

/// Assembled output keeps methods at the assembled indentation.
#[test]
fn test_assembled_methods_use_shifted_indent() {
    let temp = tempdir().unwrap();
    write_fragments(temp.path(), &[("items.yml", ITEMS), (CORE, CORE_SCHEMA)]);

    let set = FragmentLoader::new(CORE).load(temp.path()).unwrap();
    let rendered = SpecAssembler::default().assemble(&set).unwrap().render();

    assert!(rendered.contains("\n    get:\n"));
    let as_fragment = Document {
        layout: forge_spec::DocumentLayout::Fragment,
        ..Document::assembled("unified.yml", &rendered)
    };
    assert_eq!(StructuralAuditor::coverage(&as_fragment).operation_count, 0);
}
