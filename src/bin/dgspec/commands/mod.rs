//! Command implementations

pub mod build;
pub mod completions;
pub mod normalize;
pub mod query;

use anyhow::{Context, Result};

use dgspec::core::graph_spec::PathComparer;
use dgspec::json::ReaderKind;
use dgspec::ops::LoadOptions;
use dgspec::util::config::{global_config_path, load_config, project_config_path};
use dgspec::Config;

use crate::cli::{PathCaseArg, ReadOptions, ReaderArg};

/// Configuration for the current directory.
pub fn current_config() -> Result<(Config, std::path::PathBuf)> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));
    Ok((config, cwd))
}

/// The comparer from `--path-case`, falling back to config.
pub fn comparer(arg: Option<PathCaseArg>, config: &Config) -> PathComparer {
    match arg {
        Some(PathCaseArg::Platform) => PathComparer::platform(),
        Some(PathCaseArg::Sensitive) => PathComparer::Sensitive,
        Some(PathCaseArg::Insensitive) => PathComparer::Insensitive,
        None => config.path_comparer(),
    }
}

/// Read options from flags, falling back to config.
pub fn load_options(read: &ReadOptions, config: &Config) -> LoadOptions {
    LoadOptions {
        comparer: comparer(read.path_case, config),
        reader: match read.reader {
            Some(ReaderArg::Streaming) => ReaderKind::Streaming,
            Some(ReaderArg::ValueTree) => ReaderKind::ValueTree,
            None => config.reader_kind(),
        },
    }
}
