//! Error display formatting for the CLI.

use crate::constants;
use crate::error::Error;

/// Prints an error message, either as JSON or user-friendly format.
pub fn print_error_with_json(error: &Error, json_format: bool) {
    if json_format {
        if let Ok(json_output) = serde_json::to_string_pretty(&error.to_json()) {
            eprintln!("{json_output}");
            return;
        }
    }
    print_error(error);
}

/// Prints a user-friendly error message with context and suggestions.
pub fn print_error(error: &Error) {
    eprintln!("{}", render_error(error));
}

/// Heading, detail and optional hint for an error.
fn describe(error: &Error) -> (String, String, Option<&str>) {
    match error {
        Error::Internal {
            kind,
            message,
            context,
        } => (
            kind.to_string(),
            message.clone(),
            context.as_ref().and_then(|ctx| ctx.suggestion.as_deref()),
        ),
        Error::Io(io_err) => {
            let (title, hint) = match io_err.kind() {
                std::io::ErrorKind::NotFound => {
                    ("File Not Found", Some(constants::ERR_FILE_NOT_FOUND))
                }
                std::io::ErrorKind::PermissionDenied => {
                    ("Permission Denied", Some(constants::ERR_PERMISSION))
                }
                _ => ("File System Error", None),
            };
            (title.to_string(), io_err.to_string(), hint)
        }
        Error::Yaml(yaml_err) => (
            "YAML Parsing Error".to_string(),
            yaml_err.to_string(),
            Some(constants::ERR_YAML_SYNTAX),
        ),
        Error::Json(json_err) => (
            "JSON Parsing Error".to_string(),
            json_err.to_string(),
            Some(constants::ERR_JSON_SYNTAX),
        ),
        Error::Toml(toml_err) => (
            "TOML Parsing Error".to_string(),
            toml_err.to_string(),
            Some(constants::ERR_TOML_SYNTAX),
        ),
        Error::Anyhow(anyhow_err) => ("Error".to_string(), anyhow_err.to_string(), None),
    }
}

fn render_error(error: &Error) -> String {
    let (title, detail, hint) = describe(error);
    // Internal errors already read as one line: "<Kind>: <message>".
    let mut out = if matches!(error, Error::Internal { .. }) {
        format!("{title}: {detail}")
    } else {
        format!("{title}\n{detail}")
    };
    if let Some(hint) = hint {
        out.push_str("\n\nHint: ");
        out.push_str(hint);
    }
    out
}
