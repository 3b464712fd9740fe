//! Tracing/logging initialization for the CLI.

use crate::constants;
use std::fs::{File, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Log line layout selected with `DOCSYNC_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Result<Self, String> {
        match value.map(str::to_lowercase).as_deref() {
            None | Some("text") => Ok(Self::Text),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(other.to_string()),
        }
    }
}

/// Writes logs to the file named by `DOCSYNC_LOG_FILE`, or stderr.
struct FileOrStderr {
    file: Option<Mutex<File>>,
}

impl FileOrStderr {
    fn from_env() -> Self {
        let Ok(path) = std::env::var(constants::ENV_DOCSYNC_LOG_FILE) else {
            return Self { file: None };
        };
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Self {
                file: Some(Mutex::new(file)),
            },
            Err(e) => {
                // Tracing is not yet initialized; eprintln! is the only output channel available.
                // ast-grep-ignore: no-println
                eprintln!("Warning: Could not open log file '{path}': {e}. Using stderr.");
                Self { file: None }
            }
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileOrStderr {
    type Writer = Box<dyn std::io::Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        self.file
            .as_ref()
            .and_then(|mutex| mutex.lock().ok())
            .and_then(|file| file.try_clone().ok())
            .map_or_else(
                || Box::new(std::io::stderr()) as Self::Writer,
                |cloned| Box::new(cloned) as Self::Writer,
            )
    }
}

/// Filter directive for the given `-v` count; `None` defers to `DOCSYNC_LOG`.
const fn verbosity_directive(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Initialize tracing-subscriber for diagnostic logging.
///
/// `-v` selects debug and `-vv` trace; otherwise `DOCSYNC_LOG` is used as an
/// `EnvFilter` directive, defaulting to `error`.
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let directive = verbosity_directive(verbosity).map_or_else(
        || std::env::var(constants::ENV_DOCSYNC_LOG).unwrap_or_else(|_| "error".to_string()),
        str::to_string,
    );
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("error"));

    let format_var = std::env::var(constants::ENV_DOCSYNC_LOG_FORMAT).ok();
    let log_format = LogFormat::from_env_value(format_var.as_deref()).unwrap_or_else(|other| {
        // ast-grep-ignore: no-println
        eprintln!(
            "Warning: Unrecognized {} '{other}'. Valid values: 'json', 'text'. Using 'text'.",
            constants::ENV_DOCSYNC_LOG_FORMAT
        );
        LogFormat::Text
    });

    let writer = FileOrStderr::from_env();

    match log_format {
        LogFormat::Json => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_span_list(false)
                .with_target(true)
                .with_line_number(true)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .init();
        }
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
    }
}
