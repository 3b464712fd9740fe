//! Handlers for `docsync openapi *` subcommands.

use crate::cli::{OpenapiCommands, OutputFormat};
use crate::config::models::GlobalConfig;
use crate::error::Error;
use crate::inspect::inspect;
use crate::refs::{self, RefsOptions, RefsOutcome};
use crate::spec::resolver::ResolveOptions;

pub async fn execute_openapi_command(
    command: OpenapiCommands,
    config: &GlobalConfig,
) -> Result<(), Error> {
    match command {
        OpenapiCommands::Refs {
            spec,
            out,
            max_passes,
        } => {
            let max_passes = match max_passes {
                Some(n) => usize::try_from(n).map_err(Error::validation_error)?,
                None => config.resolver.max_passes,
            };
            let options = RefsOptions {
                out,
                resolve: ResolveOptions::with_max_passes(max_passes),
            };
            let outcome = refs::run(&spec, &options).await?;
            if let RefsOutcome::Partial { remaining, .. } = &outcome {
                tracing::warn!(
                    remaining = remaining.len(),
                    "pass budget of {max_passes} exhausted"
                );
            }
            // ast-grep-ignore: no-println
            println!("{}", outcome.message());
        }
        OpenapiCommands::Inspect {
            spec,
            feature,
            format,
        } => {
            let report = inspect(&spec, feature).await?;
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Yaml => serde_yaml::to_string(&report)?,
            };
            // ast-grep-ignore: no-println
            println!("{}", rendered.trim_end());
        }
    }
    Ok(())
}
