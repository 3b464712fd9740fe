//! The `openapi inspect` pipeline: load and analyze without modifying.

use crate::error::Error;
use crate::spec::analyzer::{analyze, FeatureName};
use crate::spec::document;
use serde_json::Value;
use std::path::Path;

/// Analyzes the definition at `spec_path` and returns the feature report, or
/// only the selected feature, as a JSON value ready for rendering.
///
/// # Errors
///
/// Propagates read, parse and analysis errors.
pub async fn inspect(spec_path: &Path, feature: Option<FeatureName>) -> Result<Value, Error> {
    let document = document::read(spec_path).await?;
    let report = analyze(&document)?;

    let value = match feature {
        Some(name) => serde_json::to_value(report.feature(name))?,
        None => serde_json::to_value(&report)?,
    };
    Ok(value)
}
