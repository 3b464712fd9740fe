//! Reading and writing API definitions as generic JSON/YAML trees.
//!
//! The resolver works on an untyped [`serde_json::Value`] rather than a typed
//! `OpenAPI` model: vendor extensions, unknown keywords and Swagger 2.0 keys must
//! survive a rewrite untouched, and key order is preserved so that diffs of a
//! processed file stay small.

use crate::atomic::atomic_write;
use crate::constants;
use crate::error::Error;
use serde_json::{Map, Value};
use std::path::Path;

/// Serialization format of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Infers the format from a file extension: `.json` is JSON, anything
    /// else is treated as YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(constants::FILE_EXT_JSON) => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// An API definition held in memory for the duration of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
    format: SpecFormat,
}

impl Document {
    #[must_use]
    pub const fn new(root: Value, format: SpecFormat) -> Self {
        Self { root, format }
    }

    /// Parses `content` according to `format`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` or `Error::Yaml` if the content is not
    /// syntactically valid for the format.
    pub fn parse(content: &str, format: SpecFormat) -> Result<Self, Error> {
        let root = match format {
            SpecFormat::Json => serde_json::from_str(content)?,
            SpecFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(Self { root, format })
    }

    /// Serializes the document in `format`.
    ///
    /// JSON is pretty-printed with two-space indentation. YAML goes through
    /// `serde_yaml`, which never emits anchors or aliases, so rewritten
    /// references are not folded back into shared nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be serialized.
    pub fn render(&self, format: SpecFormat) -> Result<String, Error> {
        match format {
            SpecFormat::Json => {
                let mut out = serde_json::to_string_pretty(&self.root)?;
                out.push('\n');
                Ok(out)
            }
            SpecFormat::Yaml => Ok(serde_yaml::to_string(&self.root)?),
        }
    }

    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    /// The format the document was read in.
    #[must_use]
    pub const fn format(&self) -> SpecFormat {
        self.format
    }

    /// Returns `components.schemas`, if present and a mapping.
    #[must_use]
    pub fn schemas(&self) -> Option<&Map<String, Value>> {
        self.root
            .get(constants::FIELD_COMPONENTS)?
            .get(constants::FIELD_SCHEMAS)?
            .as_object()
    }

    /// Mutable access to `components.schemas`, if present and a mapping.
    pub fn schemas_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.root
            .get_mut(constants::FIELD_COMPONENTS)?
            .get_mut(constants::FIELD_SCHEMAS)?
            .as_object_mut()
    }
}

/// Reads and parses the definition at `path`, detecting the format from its
/// extension.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, or a parse error if its
/// content is not valid JSON/YAML.
pub async fn read(path: &Path) -> Result<Document, Error> {
    let content = tokio::fs::read_to_string(path).await?;
    let format = SpecFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, "reading definition");
    Document::parse(&content, format)
}

/// Serializes `document` in the format implied by `path` and replaces the file
/// atomically.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn write(path: &Path, document: &Document) -> Result<(), Error> {
    let format = SpecFormat::from_path(path);
    let content = document.render(format)?;
    atomic_write(path, content.as_bytes()).await?;
    tracing::debug!(path = %path.display(), ?format, bytes = content.len(), "wrote definition");
    Ok(())
}
