//! High-level operations.
//!
//! This module contains the implementation of dgspec commands.

pub mod build;
pub mod graph;

pub use build::{build_graph, build_restore_file, save_graph, BuildFileOptions, BuildReport};
pub use graph::{
    closure_names, load_graph, normalize, parent_names, root_names, sorted_names, LoadOptions,
    NormalizeOptions,
};
