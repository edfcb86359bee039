//! Configuration file support for dgspec.
//!
//! dgspec reads two configuration files:
//! - Global: `<config dir>/dgspec/config.toml` - User-wide defaults
//! - Project: `.dgspec/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::graph_spec::PathComparer;
use crate::json::ReaderKind;

/// Default file name for documents written by `dgspec build`.
pub const DEFAULT_OUTPUT_FILE: &str = "restore.dg";

/// dgspec configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graph settings
    pub graph: GraphConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// How project unique names and paths are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathCase {
    /// Follow the host file system.
    #[default]
    Platform,
    Sensitive,
    Insensitive,
}

impl PathCase {
    pub fn comparer(self) -> PathComparer {
        match self {
            PathCase::Platform => PathComparer::platform(),
            PathCase::Sensitive => PathComparer::Sensitive,
            PathCase::Insensitive => PathComparer::Insensitive,
        }
    }
}

/// Which JSON reader loads documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReaderSetting {
    #[default]
    Streaming,
    ValueTree,
}

/// Graph-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Path comparison (platform, sensitive, insensitive)
    #[serde(rename = "path-case")]
    pub path_case: Option<PathCase>,

    /// JSON reader (streaming, value-tree)
    pub reader: Option<ReaderSetting>,
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print the document hash after writing it
    #[serde(default)]
    pub hash: bool,

    /// Default output file for `dgspec build`
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.graph.path_case.is_some() {
            self.graph.path_case = other.graph.path_case;
        }
        if other.graph.reader.is_some() {
            self.graph.reader = other.graph.reader;
        }

        if other.output.hash {
            self.output.hash = true;
        }
        if other.output.file.is_some() {
            self.output.file = other.output.file;
        }
    }

    /// The path comparer for graphs built or loaded under this config.
    pub fn path_comparer(&self) -> PathComparer {
        self.graph.path_case.unwrap_or_default().comparer()
    }

    pub fn reader_kind(&self) -> ReaderKind {
        match self.graph.reader.unwrap_or_default() {
            ReaderSetting::Streaming => ReaderKind::Streaming,
            ReaderSetting::ValueTree => ReaderKind::ValueTree,
        }
    }

    /// Output file for `dgspec build`, relative paths resolved against `root`.
    pub fn output_file(&self, root: &Path) -> PathBuf {
        let file = self
            .output
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
        root.join(file)
    }
}

/// Get the global config path.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "dgspec").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Get the project config path (.dgspec/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".dgspec").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.dgspec/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}
