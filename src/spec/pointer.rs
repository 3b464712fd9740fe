//! Reference paths: JSON-pointer locations inside `components.schemas`.

use crate::constants;
use std::fmt;

/// Minimum number of `/`-separated segments in a location the resolver can act
/// on: `#`, `components`, `schemas`, name, `properties`, property.
pub const MIN_LOCATION_SEGMENTS: usize = 6;

/// A parsed location such as `#/components/schemas/Pet/properties/owner`.
///
/// Segments are stored unescaped (`~1` becomes `/`, `~0` becomes `~`), with the
/// leading `#` kept as the first segment so indices match the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefPath {
    segments: Vec<String>,
}

impl RefPath {
    /// Splits a location string into its unescaped segments.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        Self {
            segments: location.split('/').map(unescape).collect(),
        }
    }

    /// Builds the location of `segments` below `#`.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: std::iter::once("#".to_string())
                .chain(segments.into_iter().map(Into::into))
                .collect(),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path is rooted at `#/components/schemas`.
    #[must_use]
    pub fn is_schema_path(&self) -> bool {
        self.segments.len() > 3
            && self.segments[0] == "#"
            && self.segments[1] == constants::FIELD_COMPONENTS
            && self.segments[2] == constants::FIELD_SCHEMAS
    }

    /// Name of the schema owning this location (`segments[3]`).
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.segments.get(3).map(String::as_str)
    }

    /// Name of the property holding the reference, when the location goes
    /// through `properties` (`segments[5]`).
    #[must_use]
    pub fn property_name(&self) -> Option<&str> {
        match self.segments.get(4).map(String::as_str) {
            Some(constants::FIELD_PROPERTIES) => self.segments.get(5).map(String::as_str),
            _ => None,
        }
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }
}

impl fmt::Display for RefPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
                f.write_str(&escape(segment))?;
            } else {
                f.write_str(segment)?;
            }
        }
        Ok(())
    }
}

/// Location string of a property of a named schema.
#[must_use]
pub fn property_location(schema_name: &str, property_name: &str) -> String {
    RefPath::from_segments([
        constants::FIELD_COMPONENTS,
        constants::FIELD_SCHEMAS,
        schema_name,
        constants::FIELD_PROPERTIES,
        property_name,
    ])
    .to_string()
}

/// The `$ref` string pointing at a named schema.
#[must_use]
pub fn schema_ref(schema_name: &str) -> String {
    format!("{}{}", constants::SCHEMA_REF_PREFIX, escape(schema_name))
}

/// Extracts the schema name from a local `#/components/schemas/<Name>`
/// reference. References into a schema (`.../Name/properties/x`) and external
/// references yield `None`.
#[must_use]
pub fn schema_name_from_ref(reference: &str) -> Option<String> {
    let name = reference.strip_prefix(constants::SCHEMA_REF_PREFIX)?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(unescape(name))
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
