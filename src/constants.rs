//! Centralized string constants for the docsync CLI
//!
//! This module contains commonly used string literals to:
//! - Reduce string duplication
//! - Keep user-facing messages consistent across commands

// Environment Variables
pub const ENV_DOCSYNC_CONFIG_DIR: &str = "DOCSYNC_CONFIG_DIR";
pub const ENV_DOCSYNC_LOG: &str = "DOCSYNC_LOG";
pub const ENV_DOCSYNC_LOG_FORMAT: &str = "DOCSYNC_LOG_FORMAT";
pub const ENV_DOCSYNC_LOG_FILE: &str = "DOCSYNC_LOG_FILE";

// File System Messages
pub const ERR_FILE_NOT_FOUND: &str = "Check that the file path is correct and the file exists.";
pub const ERR_PERMISSION: &str = "Check file permissions or run with appropriate privileges.";

// Validation Messages
pub const ERR_YAML_SYNTAX: &str = "Check that your API definition is valid YAML syntax.";
pub const ERR_JSON_SYNTAX: &str = "Check that your API definition is valid JSON syntax.";
pub const ERR_TOML_SYNTAX: &str = "Check that your configuration file is valid TOML syntax.";

// Status lines for `openapi refs`
pub const MSG_NO_CIRCULAR_REFS: &str =
    "The file does not contain circular or recursive references.";
pub const MSG_PROCESSED_PREFIX: &str = "Processed and updated";
pub const MSG_ITERATION_LIMIT: &str =
    "Maximum iteration limit reached. Some circular references may remain unresolved.";

// Default Values
pub const DEFAULT_MAX_PASSES: usize = 5;
pub const MAX_PASSES_LIMIT: usize = 100;

// File names and extensions
pub const CONFIG_FILENAME: &str = "config.toml";
pub const CONFIG_DIR_NAME: &str = "docsync";
pub const FILE_EXT_JSON: &str = "json";

// OpenAPI document layout
pub const FIELD_COMPONENTS: &str = "components";
pub const FIELD_SCHEMAS: &str = "schemas";
pub const FIELD_PROPERTIES: &str = "properties";
pub const FIELD_ITEMS: &str = "items";
pub const FIELD_REF: &str = "$ref";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_REQUIRED: &str = "required";
pub const FIELD_DESCRIPTION: &str = "description";

/// Prefix shared by every local schema reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Suffix of synthesized cycle-breaking schemas, and the marker the resolver
/// uses to recognise them.
pub const REF_SCHEMA_SUFFIX: &str = "Ref";

// Schema Types
pub const SCHEMA_TYPE_OBJECT: &str = "object";
