//! Implementation of `dgspec build`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::graph_spec::{DependencyGraphSpec, PathComparer};
use crate::core::log_code::LogCode;
use crate::msbuild::{self, load_items, BuildOptions, MsBuildItem};
use crate::util::diagnostic::{replay_messages, RestoreLogMessage};

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildFileOptions {
    /// JSON item file produced by project evaluation
    pub items: PathBuf,

    /// Where to write the restore document
    pub output: PathBuf,

    /// How project unique names compare
    pub comparer: PathComparer,

    /// Compute the document hash after writing
    pub hash: bool,
}

/// What a build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub output: PathBuf,
    pub projects: usize,
    pub restore: usize,
    /// Recorded and generated messages, in replay order
    pub messages: Vec<RestoreLogMessage>,
    /// Number of error-level messages
    pub errors: usize,
    pub hash: Option<String>,
}

/// Build a graph from an item file and write it as a restore document.
pub fn build_restore_file(opts: &BuildFileOptions) -> Result<BuildReport> {
    let items = load_items(&opts.items)?;
    let graph = build_graph(&items, opts.comparer)
        .with_context(|| format!("failed to build restore graph from {}", opts.items.display()))?;

    let mut messages = msbuild::log_messages(&items);
    messages.extend(skipped_roots(&items, &graph));
    let errors = replay_messages(&messages);

    save_graph(&graph, &opts.output)?;
    tracing::debug!(
        "wrote {} projects ({} restore roots) to {}",
        graph.project_count(),
        graph.restore().count(),
        opts.output.display()
    );

    Ok(BuildReport {
        output: opts.output.clone(),
        projects: graph.project_count(),
        restore: graph.restore().count(),
        messages,
        errors,
        hash: opts.hash.then(|| graph.hash()),
    })
}

/// Build a graph from items held in memory.
pub fn build_graph<I: MsBuildItem>(items: &[I], comparer: PathComparer) -> Result<DependencyGraphSpec> {
    let options = BuildOptions::default().with_comparer(comparer);
    Ok(msbuild::build_graph_spec_with(items, &options)?)
}

/// Write a graph to `path`.
pub fn save_graph(graph: &DependencyGraphSpec, path: &Path) -> Result<()> {
    graph
        .save(path)
        .with_context(|| format!("failed to write restore document: {}", path.display()))
}

/// NU1503 warnings for restore roots the graph left out.
fn skipped_roots<I: MsBuildItem>(items: &[I], graph: &DependencyGraphSpec) -> Vec<RestoreLogMessage> {
    let comparer = graph.comparer();
    let mut seen: Vec<&str> = Vec::new();
    let mut messages = Vec::new();

    for item in items.iter().filter(|item| item.is_type("restorespec")) {
        let Some(name) = item.property("ProjectUniqueName") else {
            continue;
        };
        if graph.is_restore_root(name) || seen.iter().any(|s| comparer.eq(s, name)) {
            continue;
        }
        seen.push(name);
        messages.push(
            RestoreLogMessage::warning(
                LogCode::NU1503,
                format!("Skipping restore for project '{}'. The project file may be invalid or missing targets required for restore.", name),
            )
            .with_project_path(name),
        );
    }

    messages
}
