//! File format errors for restore documents.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// A restore document that could not be read.
///
/// `line` and `column` are 1-based; a line of 0 means the position is not
/// known (e.g. errors found while reading an already parsed value tree).
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{}", self.describe())]
#[diagnostic(
    code(dgspec::json::file_format),
    help("Check the restore document for syntax errors or unexpected value types")
)]
pub struct FileFormatError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub path: Option<PathBuf>,
}

impl FileFormatError {
    pub fn new(message: impl Into<String>) -> Self {
        FileFormatError {
            message: message.into(),
            line: 0,
            column: 0,
            path: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn has_position(&self) -> bool {
        self.line > 0
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(path) = &self.path {
            out.push_str(&format!("{}: ", path.display()));
        }
        out.push_str(&self.message);
        if self.has_position() {
            out.push_str(&format!(" (line {}, column {})", self.line, self.column));
        }
        out
    }
}

impl From<serde_json::Error> for FileFormatError {
    fn from(err: serde_json::Error) -> Self {
        let text = err.to_string();
        // serde_json appends the position to the message; keep it separate.
        let message = match text.rfind(" at line ") {
            Some(idx) if err.line() > 0 => text[..idx].to_string(),
            _ => text,
        };
        FileFormatError::new(message).at(err.line(), err.column())
    }
}

/// Attach a path to a reader error.
pub(crate) fn in_file(err: impl Into<FileFormatError>, path: &Path) -> FileFormatError {
    err.into().with_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_split_from_message() {
        let err = serde_json::from_str::<serde_json::Value>("{\n  \"a\": }").unwrap_err();
        let err = FileFormatError::from(err);
        assert_eq!(err.line, 2);
        assert!(err.column > 0);
        assert!(!err.message.contains("at line"));
        assert!(err.to_string().contains("(line 2, column"));
    }

    #[test]
    fn test_path_in_message() {
        let err = FileFormatError::new("bad").with_path("/tmp/a.dg");
        assert_eq!(err.to_string(), "/tmp/a.dg: bad");
        assert!(!err.has_position());
    }
}
