//! Output abstraction for quiet mode support.
//!
//! Informational and success messages are suppressed in quiet mode. Requested
//! data, such as `openapi refs` status lines or `config get` values, is
//! printed directly and never suppressed.

use std::fmt::Display;

/// Output handler that respects quiet mode.
///
/// Quiet mode is enabled by `--quiet` or `--json-errors`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    quiet: bool,
}

impl Output {
    #[must_use]
    pub const fn new(quiet: bool, json_errors: bool) -> Self {
        Self {
            quiet: quiet || json_errors,
        }
    }

    /// Print a heading or other informational line.
    pub fn info(&self, msg: impl Display) {
        self.emit(msg);
    }

    /// Print a confirmation such as "Set resolver.max_passes = 10".
    pub fn success(&self, msg: impl Display) {
        self.emit(msg);
    }

    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn emit(&self, msg: impl Display) {
        if !self.quiet {
            // ast-grep-ignore: no-println
            println!("{msg}");
        }
    }
}
