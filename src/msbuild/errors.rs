//! Errors raised while building a graph from items.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::log_code::LogCode;
use crate::json::FileFormatError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A hard stop while building a graph spec.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid {property} '{value}' in {project}")]
    InvalidVersion {
        project: String,
        property: String,
        value: String,
    },

    #[error("central package version management is enabled for {project} but versions are set on: {}", packages.join(", "))]
    CentralVersionViolation {
        project: String,
        packages: Vec<String>,
    },

    #[error("download dependencies of {project} must use exact versions: {}", packages.join(", "))]
    NonExactDownloadVersion {
        project: String,
        packages: Vec<String>,
    },

    #[error("{project} sets both PackageTargetFallback and AssetTargetFallback for {framework}")]
    FallbackConflict { project: String, framework: String },

    #[error("{property} of {project} mixes `clear` with other values")]
    InvalidClear { project: String, property: String },

    #[error("failed to read project.json for {project}")]
    ProjectJson {
        project: String,
        #[source]
        source: FileFormatError,
    },
}

impl BuildError {
    /// The restore log code for this failure, if it has one.
    pub fn code(&self) -> Option<LogCode> {
        match self {
            BuildError::CentralVersionViolation { .. } => Some(LogCode::NU1008),
            BuildError::NonExactDownloadVersion { .. } => Some(LogCode::NU1011),
            BuildError::FallbackConflict { .. } => Some(LogCode::NU1003),
            BuildError::InvalidClear { .. } => Some(LogCode::NU1002),
            BuildError::InvalidVersion { .. } | BuildError::ProjectJson { .. } => None,
        }
    }

    /// The project the failure belongs to.
    pub fn project(&self) -> &str {
        match self {
            BuildError::InvalidVersion { project, .. }
            | BuildError::CentralVersionViolation { project, .. }
            | BuildError::NonExactDownloadVersion { project, .. }
            | BuildError::FallbackConflict { project, .. }
            | BuildError::InvalidClear { project, .. }
            | BuildError::ProjectJson { project, .. } => project,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = match self.code() {
            Some(code) => format!("{}: {}", code, self),
            None => self.to_string(),
        };
        let diag = Diagnostic::error(message).with_location(PathBuf::from(self.project()));

        match self {
            BuildError::InvalidVersion { value, .. } => diag
                .with_context(format!("'{}' is not a version or version range", value)),
            BuildError::CentralVersionViolation { packages, .. } => {
                let mut diag = diag;
                for package in packages {
                    diag = diag.with_context(format!("PackageReference `{}` declares a version", package));
                }
                diag.with_suggestion(suggestions::CENTRAL_VERSION)
            }
            BuildError::NonExactDownloadVersion { .. } => {
                diag.with_suggestion(suggestions::DOWNLOAD_VERSION)
            }
            BuildError::FallbackConflict { .. } => {
                diag.with_suggestion(suggestions::FALLBACK_CONFLICT)
            }
            BuildError::InvalidClear { .. } => diag.with_suggestion(suggestions::CLEAR_KEYWORD),
            BuildError::ProjectJson { source, .. } => diag
                .with_context(source.to_string())
                .with_suggestion(suggestions::BAD_DOCUMENT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_violation_lists_packages() {
        let err = BuildError::CentralVersionViolation {
            project: "/src/a.csproj".into(),
            packages: vec!["x".into(), "y".into()],
        };
        assert_eq!(err.code(), Some(LogCode::NU1008));
        assert!(err.to_string().ends_with("versions are set on: x, y"));

        let output = err.to_diagnostic().format(false);
        assert!(output.starts_with("error: NU1008: "));
        assert!(output.contains("PackageReference `y` declares a version"));
    }
}
