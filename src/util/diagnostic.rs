//! User-friendly diagnostic messages and restore log replay.
//!
//! Hard failures are converted to a [`Diagnostic`] at the CLI boundary. Soft
//! warnings collected during restore are [`RestoreLogMessage`]s and are
//! replayed through `tracing` once the pass is over.

use std::fmt;
use std::path::PathBuf;

use crate::core::log_code::LogCode;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when a graph document cannot be read.
    pub const BAD_DOCUMENT: &str =
        "help: Regenerate the document with `dgspec build` or check it with `dgspec normalize`";

    /// Suggestion when a project name is not in the graph.
    pub const PROJECT_NOT_FOUND: &str = "help: Run `dgspec sort` to list every project in the graph";

    /// Suggestion for central version violations.
    pub const CENTRAL_VERSION: &str =
        "help: Move the version to a PackageVersion item or remove it from the PackageReference";

    /// Suggestion for non-exact download dependencies.
    pub const DOWNLOAD_VERSION: &str = "help: Use an exact version such as `[1.0.0]`";

    /// Suggestion when a clear keyword is mixed with values.
    pub const CLEAR_KEYWORD: &str = "help: Use `clear` on its own or remove it";

    /// Suggestion for conflicting fallback properties.
    pub const FALLBACK_CONFLICT: &str =
        "help: Replace PackageTargetFallback with AssetTargetFallback";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    Help,
    #[default]
    Note,
    Warning,
    Error,
}

impl Severity {
    /// Parse a log level name, e.g. `Warning`. Unknown names are notes.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            "help" => Severity::Help,
            _ => Severity::Note,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn with_severity(message: impl Into<String>, severity: Severity) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Error)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
                Severity::Help => "\x1b[1;32mhelp\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
                Severity::Help => "help",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            for suggestion in &self.suggestions {
                output.push_str(&format!("{}\n", suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// A warning or error recorded during restore, e.g. by the build evaluation
/// that produced the items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreLogMessage {
    pub code: LogCode,
    pub level: Severity,
    pub message: String,
    pub project_path: Option<String>,
}

impl RestoreLogMessage {
    pub fn warning(code: LogCode, message: impl Into<String>) -> Self {
        RestoreLogMessage {
            code,
            level: Severity::Warning,
            message: message.into(),
            project_path: None,
        }
    }

    pub fn with_project_path(mut self, path: impl Into<String>) -> Self {
        self.project_path = Some(path.into());
        self
    }
}

impl fmt::Display for RestoreLogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project_path {
            Some(path) => write!(f, "{}: {} {}: {}", path, self.level, self.code, self.message),
            None => write!(f, "{} {}: {}", self.level, self.code, self.message),
        }
    }
}

/// Replay collected messages through the logger, in order. Returns the number
/// of errors replayed.
pub fn replay_messages(messages: &[RestoreLogMessage]) -> usize {
    let mut errors = 0;
    for message in messages {
        match message.level {
            Severity::Error => {
                errors += 1;
                tracing::error!("{}", message);
            }
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Note | Severity::Help => tracing::info!("{}", message),
        }
    }
    errors
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
