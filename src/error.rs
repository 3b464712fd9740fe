use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Categories of errors raised by the crate itself (as opposed to wrapped
/// library errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The document could not be analyzed (unexpected structure)
    Analysis,
    /// A circular-reference location does not match the document
    InvalidReferencePath,
    /// Configuration file or setting problems
    Config,
    /// Generic input validation failures
    Validation,
    /// Serialization of an in-memory value failed
    Serialization,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "Analysis",
            Self::InvalidReferencePath => "InvalidReferencePath",
            Self::Config => "Config",
            Self::Validation => "Validation",
            Self::Serialization => "Serialization",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Additional information attached to an internal error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Structured details for `--json-errors` output
    pub details: Option<serde_json::Value>,
    /// A hint shown to the user below the message
    pub suggestion: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn with_suggestion(suggestion: impl Into<String>) -> Self {
        Self {
            details: None,
            suggestion: Some(suggestion.into()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{kind}: {message}")]
    Internal {
        kind: ErrorKind,
        message: String,
        context: Option<ErrorContext>,
    },
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// JSON representation of an error for structured output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error_type: String,
    pub message: String,
    pub context: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl Error {
    fn internal(kind: ErrorKind, message: impl Into<String>, context: Option<ErrorContext>) -> Self {
        Self::Internal {
            kind,
            message: message.into(),
            context,
        }
    }

    /// The document does not have the structure the analyzer expects.
    #[must_use]
    pub fn analysis_error(message: impl Into<String>) -> Self {
        Self::internal(
            ErrorKind::Analysis,
            message,
            Some(ErrorContext::with_suggestion(
                "Check that the file is an OpenAPI or Swagger definition.",
            )),
        )
    }

    /// A circular-reference location cannot be mapped onto the document.
    #[must_use]
    pub fn invalid_reference_path(location: &str, reason: &str) -> Self {
        Self::internal(
            ErrorKind::InvalidReferencePath,
            format!("Invalid reference path '{location}': {reason}"),
            Some(
                ErrorContext::with_suggestion(
                    "This may be a bug. Please report it along with the definition you were processing.",
                )
                .with_details(serde_json::json!({ "location": location })),
            ),
        )
    }

    #[must_use]
    pub fn invalid_config(reason: impl fmt::Display) -> Self {
        Self::internal(
            ErrorKind::Config,
            format!("Invalid configuration: {reason}"),
            None,
        )
    }

    #[must_use]
    pub fn validation_error(message: impl fmt::Display) -> Self {
        Self::internal(
            ErrorKind::Validation,
            format!("Validation error: {message}"),
            None,
        )
    }

    #[must_use]
    pub fn serialization_error(reason: impl fmt::Display) -> Self {
        Self::internal(ErrorKind::Serialization, reason.to_string(), None)
    }

    #[must_use]
    pub fn home_directory_not_found() -> Self {
        Self::internal(
            ErrorKind::Config,
            "Could not determine the home directory",
            Some(ErrorContext::with_suggestion(format!(
                "Set {} to choose a configuration directory explicitly.",
                crate::constants::ENV_DOCSYNC_CONFIG_DIR
            ))),
        )
    }

    #[must_use]
    pub fn unknown_setting_key(key: &str) -> Self {
        let valid = crate::config::settings::SettingKey::ALL
            .iter()
            .map(crate::config::settings::SettingKey::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Self::internal(
            ErrorKind::Config,
            format!("Unknown setting key '{key}'"),
            Some(ErrorContext::with_suggestion(format!(
                "Valid keys are: {valid}"
            ))),
        )
    }

    #[must_use]
    pub fn invalid_setting_value(key: crate::config::settings::SettingKey, value: &str) -> Self {
        Self::internal(
            ErrorKind::Config,
            format!(
                "Invalid value '{value}' for setting '{key}': expected {}",
                key.type_name()
            ),
            None,
        )
    }

    #[must_use]
    pub fn setting_value_out_of_range(
        key: crate::config::settings::SettingKey,
        value: &str,
        reason: &str,
    ) -> Self {
        Self::internal(
            ErrorKind::Config,
            format!("Value '{value}' for setting '{key}' is out of range: {reason}"),
            None,
        )
    }

    /// Returns the crate-level kind, if this is an internal error.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Internal { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Convert error to JSON representation for structured output
    #[must_use]
    pub fn to_json(&self) -> JsonError {
        let (error_type, message, context, details) = match self {
            Self::Internal {
                kind,
                message,
                context,
            } => (
                kind.as_str(),
                message.clone(),
                context.as_ref().and_then(|c| c.suggestion.clone()),
                context.as_ref().and_then(|c| c.details.clone()),
            ),
            Self::Io(io_err) => {
                let context = match io_err.kind() {
                    std::io::ErrorKind::NotFound => Some(crate::constants::ERR_FILE_NOT_FOUND),
                    std::io::ErrorKind::PermissionDenied => Some(crate::constants::ERR_PERMISSION),
                    _ => None,
                };
                (
                    "FileSystem",
                    io_err.to_string(),
                    context.map(str::to_string),
                    None,
                )
            }
            Self::Yaml(yaml_err) => (
                "YAMLParsing",
                yaml_err.to_string(),
                Some(crate::constants::ERR_YAML_SYNTAX.to_string()),
                None,
            ),
            Self::Json(json_err) => (
                "JSONParsing",
                json_err.to_string(),
                Some(crate::constants::ERR_JSON_SYNTAX.to_string()),
                None,
            ),
            Self::Toml(toml_err) => (
                "TOMLParsing",
                toml_err.to_string(),
                Some(crate::constants::ERR_TOML_SYNTAX.to_string()),
                None,
            ),
            Self::Anyhow(err) => ("Unexpected", err.to_string(), None, None),
        };

        JsonError {
            error_type: error_type.to_string(),
            message,
            context,
            details,
        }
    }
}
