//! Shared helpers for integration tests.

use std::path::PathBuf;

/// Cached path of the docsync binary
#[allow(dead_code)]
#[allow(deprecated)]
pub static DOCSYNC_BIN: std::sync::LazyLock<PathBuf> =
    std::sync::LazyLock::new(|| assert_cmd::cargo::cargo_bin("docsync"));

/// Command for the docsync binary, isolated from the user's configuration.
#[allow(dead_code)]
pub fn docsync_cmd(config_dir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(&*DOCSYNC_BIN);
    cmd.env("DOCSYNC_CONFIG_DIR", config_dir)
        .env_remove("DOCSYNC_LOG")
        .env_remove("DOCSYNC_LOG_FILE");
    cmd
}

/// A minimal definition whose only schema references itself.
#[allow(dead_code)]
pub const NODE_SPEC_YAML: &str = r"openapi: 3.0.0
info:
  title: Tree API
  version: 1.0.0
paths: {}
components:
  schemas:
    Node:
      type: object
      properties:
        child:
          $ref: '#/components/schemas/Node'
";
