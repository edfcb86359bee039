//! dgspec - dependency graph specifications for multi-project package restore
//!
//! This crate turns build-tool item metadata into a normalized restore model,
//! answers reachability queries over project references, and reads and writes
//! the JSON restore document.

pub mod core;
pub mod json;
pub mod msbuild;
pub mod ops;
pub mod util;

pub use core::{
    graph_spec::DependencyGraphSpec, graph_spec::PathComparer, package_spec::PackageSpec,
    restore_metadata::ProjectStyle,
};
pub use json::FileFormatError;
pub use msbuild::{build_graph_spec, build_graph_spec_with, BuildError, BuildOptions};
pub use util::config::Config;
