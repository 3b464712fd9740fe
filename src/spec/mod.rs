//! `OpenAPI` document handling: loading and saving, reference paths,
//! structural analysis and circular-reference resolution.

pub mod analyzer;
pub mod document;
pub mod pointer;
pub mod resolver;

pub use analyzer::{analyze, FeatureName, FeatureReport};
pub use document::{Document, SpecFormat};
pub use pointer::RefPath;
pub use resolver::{resolve, Resolution, ResolveOptions};
