pub mod commands;
pub mod errors;
pub mod tracing_init;

use crate::spec::analyzer::FeatureName;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Output as JSON (default)
    #[default]
    Json,
    /// Output as YAML
    Yaml,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "docsync: keep OpenAPI definitions ready for your documentation platform",
    long_about = "docsync prepares local OpenAPI and Swagger definitions for upload.\n\n\
                  Circular and recursive $ref structures in components.schemas are\n\
                  rewritten into finite schema graphs that can be serialized and diffed.\n\n\
                  Examples:\n  \
                  docsync openapi refs api.yaml\n  \
                  docsync openapi refs api.json --out api.resolved.json\n  \
                  docsync openapi inspect api.yaml --feature circularRefs\n  \
                  docsync config set resolver.max_passes 10"
)]
pub struct Cli {
    /// Output all errors as structured JSON to stderr
    #[arg(long, global = true, help = "Output errors in JSON format")]
    pub json_errors: bool,

    /// Suppress non-essential output (success messages, tips, hints)
    /// Only outputs requested data and errors
    #[arg(
        long,
        short = 'q',
        global = true,
        help = "Suppress informational output"
    )]
    pub quiet: bool,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        global = true,
        action = ArgAction::Count,
        help = "Increase logging verbosity (-v for debug, -vv for trace)"
    )]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with OpenAPI and Swagger definitions
    #[command(
        long_about = "Operate on a local OpenAPI 3.x or Swagger 2.0 definition.\n\n\
                      The format (JSON or YAML) is chosen from the file extension;\n\
                      files are written back in the format they were read in."
    )]
    Openapi {
        #[command(subcommand)]
        command: OpenapiCommands,
    },
    /// Manage global configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum OpenapiCommands {
    /// Resolve circular and recursive schema references
    #[command(
        long_about = "Rewrite circular $ref chains in components.schemas.\n\n\
                      Each edge that closes a cycle is pointed at a synthesized\n\
                      '<Name>Ref' schema, a shallow copy of its target whose own\n\
                      circular properties are replaced with plain object schemas.\n\
                      The file is updated in place unless --out is given, and is\n\
                      left untouched when no circular references are found.\n\n\
                      Examples:\n  \
                      docsync openapi refs api.yaml\n  \
                      docsync openapi refs api.json --out resolved.json --max-passes 10"
    )]
    Refs {
        /// Path to the OpenAPI definition (JSON or YAML)
        spec: PathBuf,
        /// Write the result here instead of overwriting the input
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
        /// Maximum number of resolution passes (overrides config)
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..=100))]
        max_passes: Option<u64>,
    },
    /// Report the structural features of a definition
    #[command(
        long_about = "Analyze a definition without modifying it and print the feature\n\
                      report: circular and recursive references, discriminators,\n\
                      polymorphism, callbacks, links, webhooks and more.\n\n\
                      Examples:\n  \
                      docsync openapi inspect api.yaml\n  \
                      docsync openapi inspect api.yaml --feature circularRefs --format yaml"
    )]
    Inspect {
        /// Path to the OpenAPI definition (JSON or YAML)
        spec: PathBuf,
        /// Only report this feature (e.g. circularRefs, recursiveRefs)
        #[arg(long, value_name = "NAME")]
        feature: Option<FeatureName>,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a global configuration setting value
    #[command(long_about = "Set a global configuration setting value.\n\n\
                      Values are validated against the setting's type. The configuration\n\
                      file comments and formatting are preserved.\n\n\
                      Available settings:\n  \
                      resolver.max_passes          (integer)  - Maximum resolution passes (1-100)\n  \
                      agent_defaults.json_errors   (boolean)  - Output errors as JSON by default\n\n\
                      Examples:\n  \
                      docsync config set resolver.max_passes 10\n  \
                      docsync config set agent_defaults.json_errors true")]
    Set {
        /// Setting key (use `config settings` to see all available keys)
        key: String,
        /// Value to set (validated against expected type)
        value: String,
    },
    /// Get a global configuration setting value
    Get {
        /// Setting key to retrieve (use `config settings` to see all available keys)
        key: String,
        /// Output as JSON
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// List all available configuration settings
    Settings {
        /// Output as JSON
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}
