//! The JSON restore document.
//!
//! A graph document looks like this:
//!
//! ```json
//! {
//!   "format": 1,
//!   "restore": { "/src/app/app.csproj": {} },
//!   "projects": { "/src/app/app.csproj": { "version": "1.0.0", "restore": {}, "frameworks": {} } }
//! }
//! ```
//!
//! Two readers share one schema. The streaming reader deserializes text
//! straight into the schema; the value-tree reader goes through
//! [`serde_json::Value`] first. They produce identical models and report
//! errors at identical positions. Both reject duplicate object keys.
//! Errors found in a value tree passed in directly have no position.

use std::borrow::Cow;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::package_spec::PackageSpec;

pub mod error;
mod graph;
mod reader;
mod wire;
pub mod writer;

pub use error::FileFormatError;
pub use graph::{read_graph, read_graph_value};
pub use writer::{graph_to_value, package_spec_to_value, FORMAT_VERSION};

/// Which reader to use for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReaderKind {
    /// Deserialize tokens directly into the model.
    #[default]
    Streaming,
    /// Parse into a [`serde_json::Value`] first.
    ValueTree,
}

/// Read a single package spec, e.g. a `project.json` file.
pub fn read_package_spec(
    text: &str,
    name: Option<&str>,
    kind: ReaderKind,
) -> Result<PackageSpec, FileFormatError> {
    let doc: reader::PackageSpecDoc = parse_document(text, kind)?;
    let mut spec = doc.into_spec(None);
    if let Some(name) = name {
        spec.name = name.to_string();
    }
    Ok(spec)
}

/// Parse document text into `T` with the chosen reader.
pub(crate) fn parse_document<T: DeserializeOwned>(text: &str, kind: ReaderKind) -> Result<T, FileFormatError> {
    let text = strip_leading_comments(text);
    serde_json::from_str::<wire::UniqueKeys>(&text)?;
    match kind {
        ReaderKind::Streaming => Ok(serde_json::from_str(&text)?),
        ReaderKind::ValueTree => {
            let value: serde_json::Value = serde_json::from_str(&text)?;
            T::deserialize(value).map_err(|e| {
                // The tree keeps no positions; locate the failure in the text.
                let err = FileFormatError::from(e);
                match serde_json::from_str::<T>(&text) {
                    Err(located) => err.at(located.line(), located.column()),
                    Ok(_) => err,
                }
            })
        }
    }
}

/// Read a package spec file. The spec takes the file's path.
pub fn read_package_spec_file(path: &Path, name: Option<&str>) -> Result<PackageSpec, FileFormatError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        FileFormatError::new(format!("failed to read file: {}", e)).with_path(path)
    })?;
    let mut spec = read_package_spec(&text, name, ReaderKind::Streaming)
        .map_err(|e| error::in_file(e, path))?;
    spec.file_path = path.display().to_string();
    Ok(spec)
}

/// Blank out comments before the first JSON token.
///
/// Comment characters become spaces and newlines are kept, so positions in
/// error messages still match the original text.
pub fn strip_leading_comments(text: &str) -> Cow<'_, str> {
    let mut end = 0;
    loop {
        let rest = &text[end..];
        let trimmed = rest.trim_start();
        let start = end + (rest.len() - trimmed.len());
        let close = if trimmed.starts_with("/*") {
            trimmed[2..].find("*/").map(|i| start + 2 + i + 2)
        } else if trimmed.starts_with("//") {
            Some(trimmed.find('\n').map_or(text.len(), |i| start + i))
        } else {
            None
        };
        match close {
            Some(close) => end = close,
            None => break,
        }
    }

    if end == 0 {
        return Cow::Borrowed(text);
    }
    let blanked: String = text[..end]
        .chars()
        .map(|c| if c == '\n' || c == '\r' { c } else { ' ' })
        .collect();
    Cow::Owned(blanked + &text[end..])
}
