//! The `openapi refs` pipeline: load, analyze, resolve, write.

use crate::constants;
use crate::error::Error;
use crate::spec::analyzer::analyze;
use crate::spec::document;
use crate::spec::resolver::{resolve, Resolution, ResolutionStats, ResolveOptions};
use std::path::{Path, PathBuf};

/// Options for [`run`].
#[derive(Debug, Clone, Default)]
pub struct RefsOptions {
    /// Destination of the rewritten definition; the input is overwritten when
    /// `None`.
    pub out: Option<PathBuf>,
    pub resolve: ResolveOptions,
}

/// Result of a `refs` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefsOutcome {
    /// The definition had no circular references; nothing was written.
    NothingToResolve,
    /// Every circular reference was rewritten and the file updated.
    Resolved {
        path: PathBuf,
        stats: ResolutionStats,
    },
    /// The file was updated but some circular references remain.
    Partial {
        path: PathBuf,
        stats: ResolutionStats,
        remaining: Vec<String>,
    },
}

impl RefsOutcome {
    /// The single status line reported to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NothingToResolve => constants::MSG_NO_CIRCULAR_REFS.to_string(),
            Self::Resolved { path, .. } => {
                format!("{} {}", constants::MSG_PROCESSED_PREFIX, path.display())
            }
            Self::Partial { .. } => constants::MSG_ITERATION_LIMIT.to_string(),
        }
    }

    /// Path of the written file, if one was written.
    #[must_use]
    pub fn written_path(&self) -> Option<&Path> {
        match self {
            Self::NothingToResolve => None,
            Self::Resolved { path, .. } | Self::Partial { path, .. } => Some(path),
        }
    }
}

/// Resolves circular references in the definition at `spec_path`.
///
/// # Errors
///
/// Propagates read, parse, analysis, resolution and write errors unchanged.
pub async fn run(spec_path: &Path, options: &RefsOptions) -> Result<RefsOutcome, Error> {
    let mut document = document::read(spec_path).await?;

    let report = analyze(&document)?;
    if report.circular_locations().is_empty() {
        tracing::info!(path = %spec_path.display(), "no circular references found");
        return Ok(RefsOutcome::NothingToResolve);
    }
    tracing::info!(
        path = %spec_path.display(),
        circular = report.circular_locations().len(),
        recursive = report.recursive_refs.locations.len(),
        "resolving circular references"
    );

    let resolution = resolve(&mut document, &options.resolve)?;

    let path = options
        .out
        .clone()
        .unwrap_or_else(|| spec_path.to_path_buf());
    document::write(&path, &document).await?;

    Ok(match resolution {
        Resolution::Resolved(stats) => RefsOutcome::Resolved { path, stats },
        Resolution::Partial { stats, remaining } => {
            for location in &remaining {
                tracing::warn!(%location, "circular reference left unresolved");
            }
            RefsOutcome::Partial {
                path,
                stats,
                remaining,
            }
        }
    })
}
