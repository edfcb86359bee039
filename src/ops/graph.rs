//! Queries over a saved restore document.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::graph_spec::{DependencyGraphSpec, PathComparer};
use crate::json::{read_graph, ReaderKind};
use crate::ops::build::save_graph;
use crate::util::diagnostic::suggestions;

/// How to read a restore document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub comparer: PathComparer,
    pub reader: ReaderKind,
}

/// Load a restore document.
pub fn load_graph(path: &Path, opts: LoadOptions) -> Result<DependencyGraphSpec> {
    let text = crate::util::fs::read_to_string(path)?;
    read_graph(&text, opts.comparer, opts.reader)
        .map_err(|e| e.with_path(path))
        .with_context(|| format!("failed to load restore document: {}", path.display()))
}

/// Names of every project reachable from `name`, itself included, sorted.
pub fn closure_names(graph: &DependencyGraphSpec, name: &str) -> Result<Vec<String>> {
    require_project(graph, name)?;
    let mut names: Vec<String> = graph
        .get_closure(name)
        .into_iter()
        .map(|spec| spec.unique_name().to_string())
        .collect();
    names.sort();
    Ok(names)
}

/// Names of the projects that reference `name` directly, sorted.
pub fn parent_names(graph: &DependencyGraphSpec, name: &str) -> Result<Vec<String>> {
    require_project(graph, name)?;
    let mut names = graph.get_parents(name);
    names.sort();
    Ok(names)
}

/// Restore roots in document order.
pub fn root_names(graph: &DependencyGraphSpec) -> Vec<String> {
    graph.restore().map(str::to_string).collect()
}

/// Project names with every project after the projects it references.
pub fn sorted_names(graph: &DependencyGraphSpec) -> Vec<String> {
    graph
        .sort_by_dependency_order()
        .into_iter()
        .map(|spec| spec.unique_name().to_string())
        .collect()
}

/// Options for `dgspec normalize`.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub input: PathBuf,
    /// Defaults to rewriting the input in place
    pub output: Option<PathBuf>,
    pub load: LoadOptions,
    /// Restrict the document to the closure of one project
    pub project: Option<String>,
}

/// Read a document and write it back in canonical form. Returns the
/// written document's hash.
pub fn normalize(opts: &NormalizeOptions) -> Result<String> {
    let mut graph = load_graph(&opts.input, opts.load)?;

    if let Some(project) = &opts.project {
        require_project(&graph, project)?;
        graph = graph.with_project_closure(project);
    }
    if graph.comparer().is_case_insensitive() {
        let table = graph.casing_table();
        graph.normalize_path_casings(&table);
    }

    let output = opts.output.as_deref().unwrap_or(&opts.input);
    save_graph(&graph, output)?;
    Ok(graph.hash())
}

fn require_project(graph: &DependencyGraphSpec, name: &str) -> Result<()> {
    if graph.get_project_spec(name).is_none() {
        bail!(
            "project `{}` is not in the restore document\n{}",
            name,
            suggestions::PROJECT_NOT_FOUND
        );
    }
    Ok(())
}
