//! Structural feature analysis of API definitions.
//!
//! The analyzer walks a [`Document`] and reports where notable constructs
//! appear. The feature the resolver depends on is `circularRefs`: every `$ref`
//! between named schemas that lies on a directed cycle of the schema graph.
//! Schema names are graph nodes and edges are name lookups, so cycles only ever
//! exist as indices and never as owned back-references.

use crate::constants;
use crate::error::Error;
use crate::spec::document::Document;
use crate::spec::pointer::{schema_name_from_ref, RefPath};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Keywords whose value is a single subschema.
const SUBSCHEMA_KEYWORDS: &[&str] = &[
    "items",
    "additionalProperties",
    "additionalItems",
    "not",
    "contains",
    "propertyNames",
    "if",
    "then",
    "else",
];

/// Keywords whose value is a list of subschemas.
const SUBSCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems", "items"];

/// Keywords whose value maps names to subschemas.
const SUBSCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties", "$defs"];

/// Keywords holding instance data rather than definitions; never searched for
/// structural features.
const DATA_KEYWORDS: &[&str] = &["example", "examples", "default", "enum", "const"];

const POLYMORPHISM_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// A detected characteristic of a document and where it occurs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub present: bool,
    pub locations: Vec<String>,
}

impl Feature {
    fn from_locations(locations: Vec<String>) -> Self {
        Self {
            present: !locations.is_empty(),
            locations,
        }
    }
}

/// Everything the analyzer knows about a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureReport {
    pub additional_properties: Feature,
    pub callbacks: Feature,
    pub circular_refs: Feature,
    pub discriminators: Feature,
    pub links: Feature,
    pub polymorphism: Feature,
    pub recursive_refs: Feature,
    pub server_variables: Feature,
    pub webhooks: Feature,
    pub xml: Feature,
}

impl FeatureReport {
    #[must_use]
    pub const fn feature(&self, name: FeatureName) -> &Feature {
        match name {
            FeatureName::AdditionalProperties => &self.additional_properties,
            FeatureName::Callbacks => &self.callbacks,
            FeatureName::CircularRefs => &self.circular_refs,
            FeatureName::Discriminators => &self.discriminators,
            FeatureName::Links => &self.links,
            FeatureName::Polymorphism => &self.polymorphism,
            FeatureName::RecursiveRefs => &self.recursive_refs,
            FeatureName::ServerVariables => &self.server_variables,
            FeatureName::Webhooks => &self.webhooks,
            FeatureName::Xml => &self.xml,
        }
    }

    /// Locations of circular `$ref` edges.
    #[must_use]
    pub fn circular_locations(&self) -> &[String] {
        &self.circular_refs.locations
    }
}

/// Names of the features in a [`FeatureReport`], as used on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureName {
    AdditionalProperties,
    Callbacks,
    CircularRefs,
    Discriminators,
    Links,
    Polymorphism,
    RecursiveRefs,
    ServerVariables,
    Webhooks,
    Xml,
}

impl FeatureName {
    pub const ALL: &'static [Self] = &[
        Self::AdditionalProperties,
        Self::Callbacks,
        Self::CircularRefs,
        Self::Discriminators,
        Self::Links,
        Self::Polymorphism,
        Self::RecursiveRefs,
        Self::ServerVariables,
        Self::Webhooks,
        Self::Xml,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdditionalProperties => "additionalProperties",
            Self::Callbacks => "callbacks",
            Self::CircularRefs => "circularRefs",
            Self::Discriminators => "discriminators",
            Self::Links => "links",
            Self::Polymorphism => "polymorphism",
            Self::RecursiveRefs => "recursiveRefs",
            Self::ServerVariables => "serverVariables",
            Self::Webhooks => "webhooks",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let valid = Self::ALL
                    .iter()
                    .map(Self::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                Error::validation_error(format!("unknown feature '{s}' (expected one of: {valid})"))
            })
    }
}

/// A `$ref` from one named schema to another.
#[derive(Debug, Clone)]
struct Edge {
    target: usize,
    location: String,
}

/// Analyzes `document` without modifying it.
///
/// # Errors
///
/// Returns an analysis error if the document root, `components` or
/// `components.schemas` are not mappings, or if a named schema is neither a
/// mapping nor a boolean schema.
pub fn analyze(document: &Document) -> Result<FeatureReport, Error> {
    let root = document.root();
    if !root.is_object() {
        return Err(Error::analysis_error(
            "The document root must be a mapping",
        ));
    }
    validate_components(root)?;

    let mut report = FeatureReport::default();
    collect_structural_features(root, &mut report);

    let graph = SchemaGraph::build(document);
    let (circular, recursive) = graph.cyclic_edge_locations();
    tracing::debug!(
        schemas = graph.nodes.len(),
        circular = circular.len(),
        recursive = recursive.len(),
        "analyzed schema graph"
    );
    report.circular_refs = Feature::from_locations(circular);
    report.recursive_refs = Feature::from_locations(recursive);

    Ok(report)
}

fn validate_components(root: &Value) -> Result<(), Error> {
    let Some(components) = root.get(constants::FIELD_COMPONENTS) else {
        return Ok(());
    };
    if !components.is_object() {
        return Err(Error::analysis_error("`components` must be a mapping"));
    }
    let Some(schemas) = components.get(constants::FIELD_SCHEMAS) else {
        return Ok(());
    };
    let Some(schemas) = schemas.as_object() else {
        return Err(Error::analysis_error(
            "`components.schemas` must be a mapping",
        ));
    };
    for (name, schema) in schemas {
        if !(schema.is_object() || schema.is_boolean()) {
            return Err(Error::analysis_error(format!(
                "Schema '{name}' in `components.schemas` must be a mapping"
            )));
        }
    }
    Ok(())
}

// ── Schema graph ────────────────────────────────────────────────────

struct SchemaGraph {
    /// Schema name → outgoing edges, in declaration order.
    nodes: IndexMap<String, Vec<Edge>>,
}

impl SchemaGraph {
    fn build(document: &Document) -> Self {
        let Some(schemas) = document.schemas() else {
            return Self {
                nodes: IndexMap::new(),
            };
        };

        let mut nodes: IndexMap<String, Vec<Edge>> = schemas
            .keys()
            .map(|name| (name.clone(), Vec::new()))
            .collect();

        for (index, (name, schema)) in schemas.iter().enumerate() {
            let mut refs = Vec::new();
            let base = RefPath::from_segments([
                constants::FIELD_COMPONENTS,
                constants::FIELD_SCHEMAS,
                name.as_str(),
            ]);
            collect_schema_refs(schema, &base, &mut refs);

            let edges = refs
                .into_iter()
                .filter_map(|(reference, location)| {
                    let target_name = schema_name_from_ref(&reference)?;
                    let target = nodes.get_index_of(target_name.as_str())?;
                    Some(Edge {
                        target,
                        location: location.to_string(),
                    })
                })
                .collect();
            nodes[index] = edges;
        }

        Self { nodes }
    }

    /// Returns the locations of all edges lying on a cycle, and the subset of
    /// those that are self-references.
    fn cyclic_edge_locations(&self) -> (Vec<String>, Vec<String>) {
        let adjacency: Vec<Vec<usize>> = self
            .nodes
            .values()
            .map(|edges| edges.iter().map(|edge| edge.target).collect())
            .collect();
        let components = strongly_connected_components(&adjacency);

        let mut circular = Vec::new();
        let mut recursive = Vec::new();
        for (source, edges) in self.nodes.values().enumerate() {
            for edge in edges {
                if edge.target == source {
                    recursive.push(edge.location.clone());
                    circular.push(edge.location.clone());
                } else if components[source] == components[edge.target] {
                    circular.push(edge.location.clone());
                }
            }
        }
        (circular, recursive)
    }
}

/// Collects `(reference, location)` pairs for every `$ref` reachable through
/// schema keywords. The location is the mapping holding the `$ref`.
fn collect_schema_refs(schema: &Value, path: &RefPath, out: &mut Vec<(String, RefPath)>) {
    let Some(object) = schema.as_object() else {
        return;
    };

    if let Some(reference) = object.get(constants::FIELD_REF).and_then(Value::as_str) {
        out.push((reference.to_string(), path.clone()));
    }

    for (key, value) in object {
        let key = key.as_str();
        if SUBSCHEMA_MAP_KEYWORDS.contains(&key) {
            if let Some(members) = value.as_object() {
                let keyword_path = path.join(key);
                for (name, member) in members {
                    collect_schema_refs(member, &keyword_path.join(name.as_str()), out);
                }
            }
        } else if SUBSCHEMA_LIST_KEYWORDS.contains(&key) && value.is_array() {
            if let Some(members) = value.as_array() {
                let keyword_path = path.join(key);
                for (i, member) in members.iter().enumerate() {
                    collect_schema_refs(member, &keyword_path.join(i.to_string()), out);
                }
            }
        } else if SUBSCHEMA_KEYWORDS.contains(&key) {
            collect_schema_refs(value, &path.join(key), out);
        }
    }
}

/// Tarjan's algorithm; returns the component id of every node.
fn strongly_connected_components(adjacency: &[Vec<usize>]) -> Vec<usize> {
    struct State<'a> {
        adjacency: &'a [Vec<usize>],
        index: Vec<Option<usize>>,
        lowlink: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next_index: usize,
        component: Vec<usize>,
        next_component: usize,
    }

    fn connect(state: &mut State<'_>, node: usize) {
        state.index[node] = Some(state.next_index);
        state.lowlink[node] = state.next_index;
        state.next_index += 1;
        state.stack.push(node);
        state.on_stack[node] = true;

        for &succ in &state.adjacency[node] {
            match state.index[succ] {
                None => {
                    connect(state, succ);
                    state.lowlink[node] = state.lowlink[node].min(state.lowlink[succ]);
                }
                Some(succ_index) if state.on_stack[succ] => {
                    state.lowlink[node] = state.lowlink[node].min(succ_index);
                }
                Some(_) => {}
            }
        }

        if Some(state.lowlink[node]) == state.index[node] {
            while let Some(member) = state.stack.pop() {
                state.on_stack[member] = false;
                state.component[member] = state.next_component;
                if member == node {
                    break;
                }
            }
            state.next_component += 1;
        }
    }

    let n = adjacency.len();
    let mut state = State {
        adjacency,
        index: vec![None; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next_index: 0,
        component: vec![0; n],
        next_component: 0,
    };

    for node in 0..n {
        if state.index[node].is_none() {
            connect(&mut state, node);
        }
    }

    state.component
}

// ── Structural features ─────────────────────────────────────────────

fn collect_structural_features(root: &Value, report: &mut FeatureReport) {
    let mut locations = FeatureLocations::default();
    walk_features(root, &RefPath::from_segments(Vec::<String>::new()), &mut locations);

    if let Some(webhooks) = root.get("webhooks").and_then(Value::as_object) {
        locations.webhooks = webhooks
            .keys()
            .map(|name| RefPath::from_segments(["webhooks", name.as_str()]).to_string())
            .collect();
    }

    report.additional_properties = Feature::from_locations(locations.additional_properties);
    report.callbacks = Feature::from_locations(locations.callbacks);
    report.discriminators = Feature::from_locations(locations.discriminators);
    report.links = Feature::from_locations(locations.links);
    report.polymorphism = Feature::from_locations(locations.polymorphism);
    report.server_variables = Feature::from_locations(locations.server_variables);
    report.webhooks = Feature::from_locations(locations.webhooks);
    report.xml = Feature::from_locations(locations.xml);
}

#[derive(Default)]
struct FeatureLocations {
    additional_properties: Vec<String>,
    callbacks: Vec<String>,
    discriminators: Vec<String>,
    links: Vec<String>,
    polymorphism: Vec<String>,
    server_variables: Vec<String>,
    webhooks: Vec<String>,
    xml: Vec<String>,
}

fn walk_features(value: &Value, path: &RefPath, out: &mut FeatureLocations) {
    match value {
        Value::Object(object) => {
            for (key, child) in object {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                let child_path = path.join(key.as_str());
                match key.as_str() {
                    "additionalProperties" if child.is_object() || child == &Value::Bool(true) => {
                        out.additional_properties.push(child_path.to_string());
                    }
                    "callbacks" if child.is_object() => out.callbacks.push(child_path.to_string()),
                    "discriminator" if child.is_object() => {
                        out.discriminators.push(child_path.to_string());
                    }
                    "links" if child.is_object() => out.links.push(child_path.to_string()),
                    "xml" if child.is_object() => out.xml.push(child_path.to_string()),
                    "servers" => collect_server_variables(child, &child_path, out),
                    k if POLYMORPHISM_KEYWORDS.contains(&k) && child.is_array() => {
                        out.polymorphism.push(child_path.to_string());
                    }
                    _ => {}
                }
                walk_features(child, &child_path, out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk_features(item, &path.join(i.to_string()), out);
            }
        }
        _ => {}
    }
}

fn collect_server_variables(servers: &Value, path: &RefPath, out: &mut FeatureLocations) {
    let Some(servers) = servers.as_array() else {
        return;
    };
    for (i, server) in servers.iter().enumerate() {
        let has_variables = server
            .get("variables")
            .and_then(Value::as_object)
            .is_some_and(|vars| !vars.is_empty());
        if has_variables {
            out.server_variables
                .push(path.join(i.to_string()).join("variables").to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::document::SpecFormat;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::new(value, SpecFormat::Json)
    }

    #[test]
    fn test_self_reference_is_circular_and_recursive() {
        let report = analyze(&doc(json!({
            "components": {"schemas": {
                "Node": {"type": "object", "properties": {"next": {"$ref": "#/components/schemas/Node"}}}
            }}
        })))
        .unwrap();

        assert_eq!(
            report.circular_locations(),
            ["#/components/schemas/Node/properties/next"]
        );
        assert_eq!(
            report.recursive_refs.locations,
            ["#/components/schemas/Node/properties/next"]
        );
    }

    #[test]
    fn test_two_schema_cycle_reports_both_edges() {
        let report = analyze(&doc(json!({
            "components": {"schemas": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}}
            }}
        })))
        .unwrap();

        assert_eq!(
            report.circular_locations(),
            [
                "#/components/schemas/A/properties/b",
                "#/components/schemas/B/properties/a"
            ]
        );
        assert!(report.recursive_refs.locations.is_empty());
    }

    #[test]
    fn test_edges_leading_into_a_cycle_are_not_circular() {
        let report = analyze(&doc(json!({
            "components": {"schemas": {
                "Root": {"type": "object", "properties": {"node": {"$ref": "#/components/schemas/Node"}}},
                "Node": {"type": "object", "properties": {
                    "children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}
                }}
            }}
        })))
        .unwrap();

        assert_eq!(
            report.circular_locations(),
            ["#/components/schemas/Node/properties/children/items"]
        );
    }

    #[test]
    fn test_cycle_through_all_of() {
        let report = analyze(&doc(json!({
            "components": {"schemas": {
                "Base": {"allOf": [{"$ref": "#/components/schemas/Base"}]}
            }}
        })))
        .unwrap();

        assert_eq!(
            report.circular_locations(),
            ["#/components/schemas/Base/allOf/0"]
        );
        assert_eq!(report.polymorphism.locations, ["#/components/schemas/Base/allOf"]);
    }

    #[test]
    fn test_dangling_and_external_refs_are_ignored() {
        let report = analyze(&doc(json!({
            "components": {"schemas": {
                "A": {"properties": {
                    "missing": {"$ref": "#/components/schemas/Missing"},
                    "remote": {"$ref": "other.yaml#/components/schemas/A"}
                }}
            }}
        })))
        .unwrap();

        assert!(!report.circular_refs.present);
        assert!(report.circular_locations().is_empty());
    }

    #[test]
    fn test_document_without_schemas_has_no_cycles() {
        let report = analyze(&doc(json!({"openapi": "3.0.0", "paths": {}}))).unwrap();
        assert!(report.circular_locations().is_empty());
    }

    #[test]
    fn test_non_mapping_root_is_an_analysis_error() {
        let err = analyze(&doc(json!(["not", "a", "definition"]))).unwrap_err();
        assert_eq!(err.kind(), Some(crate::error::ErrorKind::Analysis));
    }

    #[test]
    fn test_non_mapping_schemas_is_an_analysis_error() {
        let err = analyze(&doc(json!({"components": {"schemas": []}}))).unwrap_err();
        assert_eq!(err.kind(), Some(crate::error::ErrorKind::Analysis));

        let err = analyze(&doc(json!({"components": {"schemas": {"A": "string"}}}))).unwrap_err();
        assert_eq!(err.kind(), Some(crate::error::ErrorKind::Analysis));
    }

    #[test]
    fn test_structural_features() {
        let report = analyze(&doc(json!({
            "openapi": "3.1.0",
            "servers": [{"url": "https://{region}.example.com", "variables": {"region": {"default": "eu"}}}],
            "webhooks": {"newPet": {}},
            "paths": {"/pets": {"get": {
                "callbacks": {"onEvent": {}},
                "responses": {"200": {"description": "ok", "links": {"next": {}}}}
            }}},
            "components": {"schemas": {
                "Pet": {
                    "type": "object",
                    "discriminator": {"propertyName": "kind"},
                    "additionalProperties": true,
                    "xml": {"name": "pet"},
                    "example": {"allOf": []}
                }
            }}
        })))
        .unwrap();

        assert_eq!(report.server_variables.locations, ["#/servers/0/variables"]);
        assert_eq!(report.webhooks.locations, ["#/webhooks/newPet"]);
        assert_eq!(report.callbacks.locations, ["#/paths/~1pets/get/callbacks"]);
        assert_eq!(
            report.links.locations,
            ["#/paths/~1pets/get/responses/200/links"]
        );
        assert_eq!(
            report.discriminators.locations,
            ["#/components/schemas/Pet/discriminator"]
        );
        assert_eq!(
            report.additional_properties.locations,
            ["#/components/schemas/Pet/additionalProperties"]
        );
        assert_eq!(report.xml.locations, ["#/components/schemas/Pet/xml"]);
        assert!(!report.polymorphism.present);
    }

    #[test]
    fn test_feature_name_parsing() {
        assert_eq!(
            "circularRefs".parse::<FeatureName>().unwrap(),
            FeatureName::CircularRefs
        );
        assert_eq!(
            "XML".parse::<FeatureName>().unwrap(),
            FeatureName::Xml
        );
        assert!("recursion".parse::<FeatureName>().is_err());
    }

    #[test]
    fn test_report_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(FeatureReport::default()).unwrap();
        assert!(value.get("circularRefs").is_some());
        assert!(value.get("additionalProperties").is_some());
        assert_eq!(value["circularRefs"]["locations"], json!([]));
    }
}
