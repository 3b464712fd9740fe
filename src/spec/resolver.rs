//! Circular `$ref` resolution.
//!
//! Cycles between named schemas are broken by materializing *ref-break*
//! schemas: for a circular edge `Owner.prop -> Target`, a shallow copy of
//! `Target` named `TargetRef` is added to `components.schemas` and the edge is
//! repointed at it. Inside the copy, edges that were themselves circular (or
//! point back at `Target`) are replaced by the placeholder `{type: object}`, so
//! the copy terminates the cycle one level down.
//!
//! Schemas whose name contains `Ref` are treated as reference wrappers: a
//! circular edge owned by a wrapper is replaced by the placeholder directly
//! instead of spawning yet another copy.
//!
//! Only edges held by a property (`.../properties/<p>`) or by the `items` of an
//! array property (`.../properties/<p>/items`) are rewritten. Cycles running
//! through other keywords are left in place and reported as unresolved.
//!
//! Resolution runs in passes. After every pass the document is analyzed again
//! and the next pass works on the fresh list of circular locations, until none
//! remain, a pass makes no progress, or the pass budget is spent.

use crate::constants;
use crate::error::Error;
use crate::spec::analyzer::analyze;
use crate::spec::document::Document;
use crate::spec::pointer::{
    property_location, schema_name_from_ref, schema_ref, RefPath, MIN_LOCATION_SEGMENTS,
};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Tuning knobs for [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Upper bound on the number of rewrite passes.
    pub max_passes: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_passes: constants::DEFAULT_MAX_PASSES,
        }
    }
}

impl ResolveOptions {
    #[must_use]
    pub const fn with_max_passes(max_passes: usize) -> Self {
        Self { max_passes }
    }
}

/// Cumulative effect of all passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub passes: usize,
    /// Names of the ref-break schemas added to `components.schemas`
    pub synthesized: Vec<String>,
    /// Edges repointed at a ref-break schema
    pub repointed: usize,
    /// Edges replaced by the object placeholder
    pub placeholders: usize,
}

impl ResolutionStats {
    fn absorb(&mut self, pass: PassSummary) {
        self.passes += 1;
        self.synthesized.extend(pass.synthesized);
        self.repointed += pass.repointed;
        self.placeholders += pass.placeholders;
    }
}

/// Terminal state of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The analyzer reports no circular references.
    Resolved(ResolutionStats),
    /// The pass budget was spent, or a pass made no progress, with circular
    /// references still present.
    Partial {
        stats: ResolutionStats,
        remaining: Vec<String>,
    },
}

impl Resolution {
    #[must_use]
    pub const fn stats(&self) -> &ResolutionStats {
        match self {
            Self::Resolved(stats) | Self::Partial { stats, .. } => stats,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// What a single pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub synthesized: Vec<String>,
    pub repointed: usize,
    pub placeholders: usize,
    /// Circular locations whose shape the resolver does not rewrite
    pub unresolved: Vec<String>,
}

impl PassSummary {
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.repointed > 0 || self.placeholders > 0
    }
}

/// Resolves circular references in `document` in place.
///
/// # Errors
///
/// Propagates analysis errors, and returns an `InvalidReferencePath` error if a
/// circular location does not match the document.
pub fn resolve(document: &mut Document, options: &ResolveOptions) -> Result<Resolution, Error> {
    let mut stats = ResolutionStats::default();
    let mut locations = analyze(document)?.circular_refs.locations;

    loop {
        if locations.is_empty() {
            tracing::info!(passes = stats.passes, "all circular references resolved");
            return Ok(Resolution::Resolved(stats));
        }
        if stats.passes >= options.max_passes {
            tracing::warn!(
                passes = stats.passes,
                remaining = locations.len(),
                "pass budget exhausted with circular references remaining"
            );
            return Ok(Resolution::Partial {
                stats,
                remaining: locations,
            });
        }

        let schemas = document.schemas_mut().ok_or_else(|| {
            Error::analysis_error("Circular references reported but `components.schemas` is missing")
        })?;
        let summary = resolve_pass(schemas, &locations)?;
        let changed = summary.changed();
        tracing::info!(
            pass = stats.passes + 1,
            circular = locations.len(),
            synthesized = summary.synthesized.len(),
            repointed = summary.repointed,
            placeholders = summary.placeholders,
            unresolved = summary.unresolved.len(),
            "resolution pass finished"
        );
        stats.absorb(summary);

        locations = analyze(document)?.circular_refs.locations;
        if !changed && !locations.is_empty() {
            tracing::warn!(
                remaining = locations.len(),
                "no rewritable circular references left"
            );
            return Ok(Resolution::Partial {
                stats,
                remaining: locations,
            });
        }
    }
}

/// Runs one rewrite pass over `locations` against `components.schemas`.
///
/// # Errors
///
/// Returns an `InvalidReferencePath` error if a location has fewer than six
/// segments, is not rooted at `#/components/schemas`, or names a schema,
/// property or reference target that does not exist.
pub fn resolve_pass(
    schemas: &mut Map<String, Value>,
    locations: &[String],
) -> Result<PassSummary, Error> {
    let circular: HashSet<&str> = locations.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut summary = PassSummary::default();

    for location in locations {
        if !seen.insert(location.as_str()) {
            continue;
        }

        let Some(edge) = locate_edge(schemas, location)? else {
            tracing::debug!(%location, "circular reference shape is not rewritable");
            summary.unresolved.push(location.clone());
            continue;
        };

        let eligible_for_placeholder = is_ref_wrapper(&edge.owner)
            && (circular.contains(location.as_str()) || edge.target == edge.owner);

        if eligible_for_placeholder {
            if let Some(slot) = edge_slot_mut(schemas, &edge) {
                *slot = placeholder();
                summary.placeholders += 1;
                tracing::debug!(%location, "replaced circular edge with placeholder");
            }
            continue;
        }

        // The edge already lands on a ref-break schema; its own edges are
        // broken above, copying it again would only stack `RefRef` schemas.
        if is_ref_wrapper(&edge.target) {
            tracing::debug!(%location, target = %edge.target, "edge already targets a ref-break schema");
            summary.unresolved.push(location.clone());
            continue;
        }

        let ref_name = ensure_ref_schema(schemas, &edge.target, &circular, &mut summary);
        if let Some(slot) = edge_slot_mut(schemas, &edge).and_then(Value::as_object_mut) {
            slot.insert(
                constants::FIELD_REF.to_string(),
                Value::String(schema_ref(&ref_name)),
            );
            summary.repointed += 1;
            tracing::debug!(%location, target = %ref_name, "repointed circular edge");
        }
    }

    Ok(summary)
}

/// Which value of the owning property holds the `$ref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Property,
    Items,
}

/// A circular edge located in the document.
#[derive(Debug, Clone)]
struct EdgeSite {
    owner: String,
    property: String,
    slot: Slot,
    target: String,
}

/// Maps a location onto the document. `Ok(None)` means the location is valid
/// but its shape is not one the resolver rewrites.
fn locate_edge(schemas: &Map<String, Value>, location: &str) -> Result<Option<EdgeSite>, Error> {
    let path = RefPath::parse(location);
    if path.len() < MIN_LOCATION_SEGMENTS {
        return Err(Error::invalid_reference_path(
            location,
            &format!("expected at least {MIN_LOCATION_SEGMENTS} path segments"),
        ));
    }
    if !path.is_schema_path() {
        return Err(Error::invalid_reference_path(
            location,
            "location is not rooted at #/components/schemas",
        ));
    }

    let owner = path.schema_name().unwrap_or_default();
    let schema = schemas.get(owner).ok_or_else(|| {
        Error::invalid_reference_path(location, &format!("schema '{owner}' does not exist"))
    })?;

    let Some(property_name) = path.property_name() else {
        return Ok(None);
    };
    let slot = match &path.segments()[MIN_LOCATION_SEGMENTS..] {
        [] => Slot::Property,
        [items] if items == constants::FIELD_ITEMS => Slot::Items,
        _ => return Ok(None),
    };

    let property = schema
        .get(constants::FIELD_PROPERTIES)
        .and_then(|properties| properties.get(property_name))
        .ok_or_else(|| {
            Error::invalid_reference_path(
                location,
                &format!("schema '{owner}' has no property '{property_name}'"),
            )
        })?;

    let holder = match slot {
        Slot::Property => Some(property),
        Slot::Items => property.get(constants::FIELD_ITEMS),
    };
    let reference = holder
        .and_then(|value| value.get(constants::FIELD_REF))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_reference_path(location, "no $ref at this location"))?;

    let target = schema_name_from_ref(reference).ok_or_else(|| {
        Error::invalid_reference_path(
            location,
            &format!("'{reference}' is not a reference to a named schema"),
        )
    })?;
    if !schemas.contains_key(&target) {
        return Err(Error::invalid_reference_path(
            location,
            &format!("referenced schema '{target}' does not exist"),
        ));
    }

    Ok(Some(EdgeSite {
        owner: owner.to_string(),
        property: property_name.to_string(),
        slot,
        target,
    }))
}

fn edge_slot_mut<'a>(schemas: &'a mut Map<String, Value>, edge: &EdgeSite) -> Option<&'a mut Value> {
    let property = schemas
        .get_mut(&edge.owner)?
        .get_mut(constants::FIELD_PROPERTIES)?
        .get_mut(&edge.property)?;
    match edge.slot {
        Slot::Property => Some(property),
        Slot::Items => property.get_mut(constants::FIELD_ITEMS),
    }
}

fn is_ref_wrapper(schema_name: &str) -> bool {
    schema_name.contains(constants::REF_SCHEMA_SUFFIX)
}

fn placeholder() -> Value {
    json!({ "type": "object" })
}

/// Returns the name of the ref-break schema for `target`, creating it if no
/// schema of that name exists yet.
fn ensure_ref_schema(
    schemas: &mut Map<String, Value>,
    target: &str,
    circular: &HashSet<&str>,
    summary: &mut PassSummary,
) -> String {
    let ref_name = format!("{target}{}", constants::REF_SCHEMA_SUFFIX);
    if schemas.contains_key(&ref_name) {
        return ref_name;
    }

    let copy = build_ref_schema(target, schemas.get(target).unwrap_or(&Value::Null), circular);
    schemas.insert(ref_name.clone(), copy);
    summary.synthesized.push(ref_name.clone());
    tracing::debug!(schema = %ref_name, source = %target, "synthesized ref-break schema");
    ref_name
}

/// Builds the ref-break copy of `source` (the schema named `source_name`).
///
/// The copy is itself a reference wrapper, so every property edge that was
/// circular, or that points back at `source_name`, becomes a placeholder.
fn build_ref_schema(source_name: &str, source: &Value, circular: &HashSet<&str>) -> Value {
    let mut properties = source
        .get(constants::FIELD_PROPERTIES)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    for (property_name, property) in &mut properties {
        let location = property_location(source_name, property_name);
        let breaks_cycle = |reference: &str, location: &str| {
            circular.contains(location)
                || schema_name_from_ref(reference).as_deref() == Some(source_name)
        };

        if let Some(reference) = property.get(constants::FIELD_REF).and_then(Value::as_str) {
            if breaks_cycle(reference, &location) {
                *property = placeholder();
            }
            continue;
        }

        let items_ref = property
            .get(constants::FIELD_ITEMS)
            .and_then(|items| items.get(constants::FIELD_REF))
            .and_then(Value::as_str);
        if let Some(reference) = items_ref {
            let items_location = format!("{location}/{}", constants::FIELD_ITEMS);
            if breaks_cycle(reference, &items_location) {
                if let Some(object) = property.as_object_mut() {
                    object.insert(constants::FIELD_ITEMS.to_string(), placeholder());
                }
            }
        }

        break_nested_cycles(property, &RefPath::parse(&location), circular);
    }

    let mut copy = Map::new();
    copy.insert(
        constants::FIELD_TYPE.to_string(),
        Value::String(constants::SCHEMA_TYPE_OBJECT.to_string()),
    );
    if let Some(description) = source.get(constants::FIELD_DESCRIPTION) {
        copy.insert(constants::FIELD_DESCRIPTION.to_string(), description.clone());
    }
    copy.insert(constants::FIELD_PROPERTIES.to_string(), Value::Object(properties));
    if let Some(required) = source.get(constants::FIELD_REQUIRED) {
        copy.insert(constants::FIELD_REQUIRED.to_string(), required.clone());
    }
    Value::Object(copy)
}

/// Replaces every `$ref` mapping below `value` whose location is circular
/// with the placeholder. `location` is the location of `value` in the source
/// schema.
fn break_nested_cycles(value: &mut Value, location: &RefPath, circular: &HashSet<&str>) {
    let children: Vec<(String, &mut Value)> = match value {
        Value::Object(object) => object
            .iter_mut()
            .map(|(key, child)| (key.clone(), child))
            .collect(),
        Value::Array(items) => items
            .iter_mut()
            .enumerate()
            .map(|(i, child)| (i.to_string(), child))
            .collect(),
        _ => return,
    };

    for (segment, child) in children {
        let child_location = location.join(segment);
        let holds_circular_ref = child.get(constants::FIELD_REF).is_some()
            && circular.contains(child_location.to_string().as_str());
        if holds_circular_ref {
            *child = placeholder();
        } else {
            break_nested_cycles(child, &child_location, circular);
        }
    }
}
