//! End-to-end tests for the `openapi refs` pipeline.

mod common;

use common::NODE_SPEC_YAML;
use docsync_cli::constants;
use docsync_cli::error::{Error, ErrorKind};
use docsync_cli::refs::{run, RefsOptions, RefsOutcome};
use docsync_cli::spec::resolver::ResolveOptions;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn read_yaml(path: &Path) -> Value {
    serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn spec_with_schemas(schemas: Value) -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {"title": "Test API", "version": "1.0.0"},
        "paths": {},
        "components": {"schemas": schemas}
    })
}

#[tokio::test]
async fn test_self_referencing_node_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.yaml");
    std::fs::write(&path, NODE_SPEC_YAML).unwrap();

    let outcome = run(&path, &RefsOptions::default()).await.unwrap();

    assert_eq!(
        outcome.message(),
        format!("Processed and updated {}", path.display())
    );
    let RefsOutcome::Resolved { stats, .. } = &outcome else {
        panic!("expected a resolved outcome, got {outcome:?}");
    };
    assert_eq!(stats.synthesized, ["NodeRef"]);
    assert_eq!(stats.passes, 1);

    let written = read_yaml(&path);
    let schemas = &written["components"]["schemas"];
    assert_eq!(
        schemas["Node"],
        json!({
            "type": "object",
            "properties": {"child": {"$ref": "#/components/schemas/NodeRef"}}
        })
    );
    assert_eq!(
        schemas["NodeRef"],
        json!({"type": "object", "properties": {"child": {"type": "object"}}})
    );
    // Everything outside the schemas is carried over.
    assert_eq!(written["info"]["title"], "Tree API");
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.yaml");
    std::fs::write(&path, NODE_SPEC_YAML).unwrap();

    run(&path, &RefsOptions::default()).await.unwrap();
    let after_first = std::fs::read_to_string(&path).unwrap();

    let outcome = run(&path, &RefsOptions::default()).await.unwrap();
    assert_eq!(outcome, RefsOutcome::NothingToResolve);
    assert_eq!(outcome.message(), constants::MSG_NO_CIRCULAR_REFS);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
}

#[tokio::test]
async fn test_definition_without_cycles_is_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flat.json");
    // Compact on purpose: a rewrite would pretty-print it.
    let original = r##"{"openapi":"3.0.0","components":{"schemas":{"Pet":{"type":"object","properties":{"owner":{"$ref":"#/components/schemas/Owner"}}},"Owner":{"type":"object"}}}}"##;
    std::fs::write(&path, original).unwrap();

    let outcome = run(&path, &RefsOptions::default()).await.unwrap();

    assert_eq!(outcome, RefsOutcome::NothingToResolve);
    assert!(outcome.written_path().is_none());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn test_two_schema_cycle_leaves_acyclic_schemas_untouched() {
    let dir = TempDir::new().unwrap();
    let pet = json!({
        "type": "object",
        "properties": {"owner": {"$ref": "#/components/schemas/Person"}}
    });
    let path = write_json(
        &dir,
        "cycle.json",
        &spec_with_schemas(json!({
            "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
            "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}},
            "Pet": pet,
            "Person": {"type": "object", "properties": {"name": {"type": "string"}}}
        })),
    );

    let outcome = run(&path, &RefsOptions::default()).await.unwrap();
    assert!(matches!(outcome, RefsOutcome::Resolved { .. }));

    let written = read_json(&path);
    let schemas = &written["components"]["schemas"];
    assert_eq!(schemas["Pet"], pet);
    assert_eq!(
        schemas["A"]["properties"]["b"],
        json!({"$ref": "#/components/schemas/BRef"})
    );
    assert_eq!(
        schemas["B"]["properties"]["a"],
        json!({"$ref": "#/components/schemas/ARef"})
    );
    assert_eq!(schemas["ARef"]["properties"]["b"], json!({"type": "object"}));
    assert_eq!(schemas["BRef"]["properties"]["a"], json!({"type": "object"}));
}

#[tokio::test]
async fn test_array_items_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "array.json",
        &spec_with_schemas(json!({
            "A": {"type": "object", "properties": {
                "bs": {"type": "array", "items": {"$ref": "#/components/schemas/B"}}
            }},
            "B": {"type": "object", "required": ["parent"], "properties": {
                "parent": {"$ref": "#/components/schemas/A"},
                "label": {"type": "string"}
            }}
        })),
    );

    let outcome = run(&path, &RefsOptions::default()).await.unwrap();
    assert!(matches!(outcome, RefsOutcome::Resolved { .. }));

    let written = read_json(&path);
    let schemas = &written["components"]["schemas"];
    assert_eq!(
        schemas["A"]["properties"]["bs"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/BRef"}})
    );
    assert_eq!(
        schemas["BRef"],
        json!({
            "type": "object",
            "properties": {
                "parent": {"type": "object"},
                "label": {"type": "string"}
            },
            "required": ["parent"]
        })
    );
}

#[tokio::test]
async fn test_cycle_through_all_of_is_partial_and_still_written() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "composed.json",
        &spec_with_schemas(json!({
            "A": {"allOf": [{"$ref": "#/components/schemas/B"}]},
            "B": {"allOf": [{"$ref": "#/components/schemas/A"}]}
        })),
    );
    let before = read_json(&path);

    let outcome = run(&path, &RefsOptions::default()).await.unwrap();

    assert_eq!(outcome.message(), constants::MSG_ITERATION_LIMIT);
    let RefsOutcome::Partial { remaining, .. } = &outcome else {
        panic!("expected a partial outcome, got {outcome:?}");
    };
    assert_eq!(
        remaining,
        &[
            "#/components/schemas/A/allOf/0".to_string(),
            "#/components/schemas/B/allOf/0".to_string()
        ]
    );
    assert_eq!(outcome.written_path(), Some(path.as_path()));
    assert_eq!(read_json(&path), before);
}

#[tokio::test]
async fn test_single_pass_budget_reports_partial() {
    let dir = TempDir::new().unwrap();
    // A hand-written ARef already points back at A, so reusing it for the
    // self-reference closes a new cycle that only a second pass breaks.
    let path = write_json(
        &dir,
        "budget.json",
        &spec_with_schemas(json!({
            "A": {"type": "object", "properties": {"self": {"$ref": "#/components/schemas/A"}}},
            "ARef": {"type": "object", "properties": {"back": {"$ref": "#/components/schemas/A"}}}
        })),
    );

    let tight = run(
        &path,
        &RefsOptions {
            out: Some(dir.path().join("tight.json")),
            resolve: ResolveOptions::with_max_passes(1),
        },
    )
    .await
    .unwrap();
    assert_eq!(tight.message(), constants::MSG_ITERATION_LIMIT);
    let RefsOutcome::Partial {
        stats, remaining, ..
    } = &tight
    else {
        panic!("expected a partial outcome, got {tight:?}");
    };
    assert_eq!(stats.passes, 1);
    assert_eq!(
        remaining,
        &[
            "#/components/schemas/A/properties/self".to_string(),
            "#/components/schemas/ARef/properties/back".to_string()
        ]
    );

    let generous = run(
        &path,
        &RefsOptions {
            out: Some(dir.path().join("generous.json")),
            resolve: ResolveOptions::default(),
        },
    )
    .await
    .unwrap();
    let RefsOutcome::Resolved { stats, .. } = &generous else {
        panic!("expected a resolved outcome, got {generous:?}");
    };
    assert_eq!(stats.passes, 2);

    let written = read_json(&dir.path().join("generous.json"));
    let schemas = &written["components"]["schemas"];
    assert_eq!(
        schemas["A"]["properties"]["self"],
        json!({"$ref": "#/components/schemas/ARef"})
    );
    assert_eq!(schemas["ARef"]["properties"]["back"], json!({"type": "object"}));
    assert!(schemas.get("ARefRef").is_none());
}

#[tokio::test]
async fn test_cycle_closed_inside_nested_property() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "nested.json",
        &spec_with_schemas(json!({
            "A": {"properties": {"b": {"$ref": "#/components/schemas/B"}}},
            "B": {"properties": {"p": {"properties": {"q": {"$ref": "#/components/schemas/A"}}}}}
        })),
    );

    let outcome = run(&path, &RefsOptions::default()).await.unwrap();

    let RefsOutcome::Resolved { stats, .. } = &outcome else {
        panic!("expected a resolved outcome, got {outcome:?}");
    };
    assert_eq!(stats.passes, 1);
    assert_eq!(stats.synthesized, ["BRef"]);

    let written = read_json(&path);
    let schemas = written["components"]["schemas"].as_object().unwrap();
    assert_eq!(
        schemas.keys().map(String::as_str).collect::<Vec<_>>(),
        ["A", "B", "BRef"]
    );
    assert_eq!(
        schemas["A"]["properties"]["b"],
        json!({"$ref": "#/components/schemas/BRef"})
    );
    assert_eq!(
        schemas["BRef"],
        json!({"type": "object", "properties": {
            "p": {"properties": {"q": {"type": "object"}}}
        }})
    );
    assert_eq!(
        schemas["B"]["properties"]["p"]["properties"]["q"],
        json!({"$ref": "#/components/schemas/A"})
    );
}

#[tokio::test]
async fn test_three_schema_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "ring.json",
        &spec_with_schemas(json!({
            "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
            "B": {"type": "object", "properties": {"c": {"$ref": "#/components/schemas/C"}}},
            "C": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}}
        })),
    );

    let outcome = run(&path, &RefsOptions::default()).await.unwrap();

    let RefsOutcome::Resolved { stats, .. } = &outcome else {
        panic!("expected a resolved outcome, got {outcome:?}");
    };
    assert_eq!(stats.passes, 1);
    assert_eq!(stats.synthesized, ["BRef", "CRef", "ARef"]);

    let written = read_json(&path);
    let schemas = &written["components"]["schemas"];
    for (owner, property, copy) in [("A", "b", "BRef"), ("B", "c", "CRef"), ("C", "a", "ARef")] {
        assert_eq!(
            schemas[owner]["properties"][property],
            json!({"$ref": format!("#/components/schemas/{copy}")})
        );
    }
    assert_eq!(schemas["ARef"]["properties"]["b"], json!({"type": "object"}));
    assert_eq!(schemas["BRef"]["properties"]["c"], json!({"type": "object"}));
    assert_eq!(schemas["CRef"]["properties"]["a"], json!({"type": "object"}));

    let document = docsync_cli::spec::document::read(&path).await.unwrap();
    let report = docsync_cli::spec::analyze(&document).unwrap();
    assert!(report.circular_locations().is_empty());
}

#[tokio::test]
async fn test_alias_cycle_is_invalid_reference_path() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "alias.json",
        &spec_with_schemas(json!({
            "A": {"$ref": "#/components/schemas/B"},
            "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}}
        })),
    );
    let before = std::fs::read_to_string(&path).unwrap();

    let err = run(&path, &RefsOptions::default()).await.unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::InvalidReferencePath));
    assert!(err.to_string().contains("#/components/schemas/A"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_out_path_leaves_input_untouched() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("tree.yaml");
    let out = dir.path().join("resolved.json");
    std::fs::write(&input, NODE_SPEC_YAML).unwrap();

    let outcome = run(
        &input,
        &RefsOptions {
            out: Some(out.clone()),
            ..RefsOptions::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.written_path(), Some(out.as_path()));
    assert_eq!(std::fs::read_to_string(&input).unwrap(), NODE_SPEC_YAML);
    // The output format follows the output path.
    let written = read_json(&out);
    assert!(written["components"]["schemas"]["NodeRef"].is_object());
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = run(&dir.path().join("missing.yaml"), &RefsOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"openapi\": ").unwrap();

    let err = run(&path, &RefsOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn test_non_mapping_schemas_is_analysis_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("odd.yaml");
    std::fs::write(&path, "openapi: 3.0.0\ncomponents:\n  schemas: [1, 2]\n").unwrap();

    let err = run(&path, &RefsOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Analysis));
}

#[tokio::test]
async fn test_bare_components_document_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "bare.json",
        &json!({"components": {"schemas": {"Node": {"type": "object", "properties": {
            "next": {"$ref": "#/components/schemas/Node"}
        }}}}}),
    );

    run(&path, &RefsOptions::default()).await.unwrap();

    let written = docsync_cli::spec::document::read(&path).await.unwrap();
    let report = docsync_cli::spec::analyze(&written).unwrap();
    assert!(report.circular_locations().is_empty());
    assert!(!report.recursive_refs.present);

    let schemas = written.schemas().unwrap();
    assert_eq!(
        schemas["Node"]["properties"]["next"],
        json!({"$ref": "#/components/schemas/NodeRef"})
    );
    assert_eq!(
        schemas["NodeRef"],
        json!({"type": "object", "properties": {"next": {"type": "object"}}})
    );
}
