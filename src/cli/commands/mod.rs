//! CLI command handlers extracted from main.rs.
//!
//! Each submodule handles a top-level command variant from [`Commands`].
//!
//! [`Commands`]: crate::cli::Commands

#[allow(clippy::missing_errors_doc)]
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod openapi;
