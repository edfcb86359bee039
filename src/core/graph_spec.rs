//! The dependency graph specification: every project taking part in a
//! restore, plus the restore roots.
//!
//! Project references are weak edges: they name another project by unique
//! name and are resolved by lookup. References that never resolve are removed
//! by [`DependencyGraphSpec::remove_missing_projects`].

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

use crate::core::package_spec::PackageSpec;

/// How project names and paths are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathComparer {
    Sensitive,
    Insensitive,
}

impl PathComparer {
    /// The comparer matching the host file system.
    pub fn platform() -> Self {
        if cfg!(windows) {
            PathComparer::Insensitive
        } else {
            PathComparer::Sensitive
        }
    }

    /// The lookup key for a name under this comparer.
    pub fn key(self, value: &str) -> String {
        match self {
            PathComparer::Sensitive => value.to_string(),
            PathComparer::Insensitive => value.to_lowercase(),
        }
    }

    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            PathComparer::Sensitive => a == b,
            PathComparer::Insensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }

    pub fn is_case_insensitive(self) -> bool {
        self == PathComparer::Insensitive
    }
}

impl Default for PathComparer {
    fn default() -> Self {
        PathComparer::platform()
    }
}

/// First-seen casing for project paths and unique names.
#[derive(Debug, Clone)]
pub struct PathCasingTable {
    comparer: PathComparer,
    entries: HashMap<String, String>,
}

impl PathCasingTable {
    pub fn new(comparer: PathComparer) -> Self {
        PathCasingTable {
            comparer,
            entries: HashMap::new(),
        }
    }

    /// Record a value; later values that compare equal keep the first casing.
    pub fn record(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.entries
            .entry(self.comparer.key(value))
            .or_insert_with(|| value.to_string());
    }

    pub fn canonical(&self, value: &str) -> Option<&str> {
        self.entries
            .get(&self.comparer.key(value))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Projects keyed by unique name, and the names of the restore roots.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DependencyGraphSpec {
    comparer: PathComparer,
    projects: BTreeMap<String, PackageSpec>,
    restore: BTreeMap<String, String>,
    extensions: serde_json::Map<String, serde_json::Value>,
}

impl DependencyGraphSpec {
    pub fn new() -> Self {
        DependencyGraphSpec::default()
    }

    pub fn with_comparer(comparer: PathComparer) -> Self {
        DependencyGraphSpec {
            comparer,
            ..DependencyGraphSpec::default()
        }
    }

    pub fn comparer(&self) -> PathComparer {
        self.comparer
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.restore.is_empty()
    }

    /// All projects, ordered by key.
    pub fn projects(&self) -> impl Iterator<Item = &PackageSpec> {
        self.projects.values()
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Restore root names with their original casing, ordered by key.
    pub fn restore(&self) -> impl Iterator<Item = &str> {
        self.restore.values().map(String::as_str)
    }

    pub fn is_restore_root(&self, name: &str) -> bool {
        self.restore.contains_key(&self.comparer.key(name))
    }

    /// Top-level document properties the model does not interpret.
    pub fn extensions(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        &mut self.extensions
    }

    /// Add a project keyed by its unique name. A project already present under
    /// the same key is kept.
    pub fn add_project(&mut self, spec: PackageSpec) {
        let key = self.comparer.key(spec.unique_name());
        self.projects.entry(key).or_insert(spec);
    }

    /// Mark a project as a restore root. Adding the same name twice records it
    /// once.
    pub fn add_restore(&mut self, name: &str) {
        self.restore
            .entry(self.comparer.key(name))
            .or_insert_with(|| name.to_string());
    }

    pub fn get_project_spec(&self, name: &str) -> Option<&PackageSpec> {
        self.projects.get(&self.comparer.key(name))
    }

    pub fn get_project_spec_mut(&mut self, name: &str) -> Option<&mut PackageSpec> {
        self.projects.get_mut(&self.comparer.key(name))
    }

    /// Unique names of every project with a reference to `name`.
    pub fn get_parents(&self, name: &str) -> Vec<String> {
        let mut parents = Vec::new();
        for spec in self.projects.values() {
            let references_child = spec
                .restore_metadata
                .project_references()
                .any(|r| self.comparer.eq(&r.project_unique_name, name));
            if references_child {
                parents.push(spec.unique_name().to_string());
            }
        }
        parents
    }

    /// Every project reachable from `name` through project references,
    /// including the project itself. Empty when `name` is unknown.
    ///
    /// The order is the traversal order; sort the result when a stable order
    /// matters.
    pub fn get_closure(&self, name: &str) -> Vec<&PackageSpec> {
        let mut closure = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![self.comparer.key(name)];

        while let Some(key) = stack.pop() {
            if !visited.insert(key.clone()) {
                continue;
            }
            let Some(spec) = self.projects.get(&key) else {
                continue;
            };
            closure.push(spec);

            let children: Vec<String> = spec
                .restore_metadata
                .project_references()
                .map(|r| self.comparer.key(&r.project_unique_name))
                .filter(|child| !visited.contains(child))
                .collect();
            // Reverse so the first reference is visited first.
            stack.extend(children.into_iter().rev());
        }
        closure
    }

    /// A new graph containing the closure of `name`, with `name` as the only
    /// restore root.
    pub fn with_project_closure(&self, name: &str) -> DependencyGraphSpec {
        let mut graph = DependencyGraphSpec::with_comparer(self.comparer);
        graph.extensions = self.extensions.clone();
        let closure = self.get_closure(name);
        if let Some(root) = closure.first() {
            graph.add_restore(root.unique_name());
        }
        for spec in closure {
            graph.add_project(spec.clone());
        }
        graph
    }

    /// A copy of this graph with one project replaced by `spec`.
    pub fn with_replaced_spec(&self, spec: PackageSpec) -> DependencyGraphSpec {
        let mut graph = self.clone();
        let key = graph.comparer.key(spec.unique_name());
        graph.projects.insert(key, spec);
        graph
    }

    /// Add all projects, restore roots and extensions of `other`. Entries
    /// already present win.
    pub fn merge(&mut self, other: &DependencyGraphSpec) {
        for spec in other.projects.values() {
            self.add_project(spec.clone());
        }
        for name in other.restore() {
            self.add_restore(name);
        }
        for (key, value) in &other.extensions {
            if !self.extensions.contains_key(key) {
                self.extensions.insert(key.clone(), value.clone());
            }
        }
    }

    /// Drop project references whose target is not in this graph.
    pub fn remove_missing_projects(&mut self) {
        let comparer = self.comparer;
        let known: HashSet<String> = self.projects.keys().cloned().collect();
        for spec in self.projects.values_mut() {
            for framework in &mut spec.restore_metadata.target_frameworks {
                framework.project_references.retain(|reference| {
                    let keep = known.contains(&comparer.key(&reference.project_unique_name));
                    if !keep {
                        tracing::debug!(
                            "dropping reference from {} to missing project {}",
                            spec.name,
                            reference.project_unique_name
                        );
                    }
                    keep
                });
            }
        }
    }

    /// The first-seen casing of every project path and unique name.
    pub fn casing_table(&self) -> PathCasingTable {
        let mut table = PathCasingTable::new(self.comparer);
        for spec in self.projects.values() {
            table.record(&spec.restore_metadata.project_path);
            table.record(&spec.restore_metadata.project_unique_name);
        }
        table
    }

    /// Rewrite project reference paths and unique names to the casing found
    /// in `table`. Values the table doesn't know are left alone.
    pub fn normalize_path_casings(&mut self, table: &PathCasingTable) {
        for spec in self.projects.values_mut() {
            for framework in &mut spec.restore_metadata.target_frameworks {
                for reference in &mut framework.project_references {
                    if let Some(path) = table.canonical(&reference.project_path) {
                        if path != reference.project_path {
                            reference.project_path = path.to_string();
                        }
                    }
                    if let Some(name) = table.canonical(&reference.project_unique_name) {
                        if name != reference.project_unique_name {
                            reference.project_unique_name = name.to_string();
                        }
                    }
                }
            }
        }
    }

    /// Projects ordered so that every project comes after the projects it
    /// references. Projects in a reference cycle are ordered by unique name.
    pub fn sort_by_dependency_order(&self) -> Vec<&PackageSpec> {
        let mut graph = DiGraph::<&PackageSpec, ()>::new();
        let mut nodes = HashMap::new();
        for (key, spec) in &self.projects {
            nodes.insert(key.as_str(), graph.add_node(spec));
        }
        for (key, spec) in &self.projects {
            let from = nodes[key.as_str()];
            for reference in spec.restore_metadata.project_references() {
                let child = self.comparer.key(&reference.project_unique_name);
                if let Some(&to) = nodes.get(child.as_str()) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        // Components come back in post order: referenced projects first.
        let mut sorted = Vec::with_capacity(self.projects.len());
        for mut component in tarjan_scc(&graph) {
            component.sort_by(|a, b| graph[*a].unique_name().cmp(graph[*b].unique_name()));
            sorted.extend(component.into_iter().map(|node| graph[node]));
        }
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::framework::NuGetFramework;
    use crate::core::restore_metadata::{
        ProjectRestoreMetadataFrameworkInfo, ProjectRestoreReference, ProjectStyle,
    };
    use proptest::prelude::*;

    fn project(name: &str, references: &[&str]) -> PackageSpec {
        let mut spec = PackageSpec::new(name);
        spec.restore_metadata.project_unique_name = name.to_string();
        spec.restore_metadata.project_path = format!("/src/{name}/{name}.csproj");
        spec.restore_metadata.project_style = ProjectStyle::PackageReference;
        let mut info =
            ProjectRestoreMetadataFrameworkInfo::new(NuGetFramework::parse("net6.0").unwrap());
        for reference in references {
            info.project_references.push(ProjectRestoreReference::new(
                *reference,
                format!("/src/{reference}/{reference}.csproj"),
            ));
        }
        spec.restore_metadata.target_frameworks.push(info);
        spec
    }

    fn graph(projects: Vec<PackageSpec>) -> DependencyGraphSpec {
        let mut dg = DependencyGraphSpec::with_comparer(PathComparer::Sensitive);
        for spec in projects {
            dg.add_project(spec);
        }
        dg
    }

    fn names(specs: &[&PackageSpec]) -> Vec<String> {
        let mut names: Vec<String> = specs.iter().map(|s| s.name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_closure_and_parents() {
        let dg = graph(vec![project("A", &["B", "C"]), project("B", &[]), project("C", &[])]);

        assert_eq!(names(&dg.get_closure("A")), ["A", "B", "C"]);
        assert_eq!(names(&dg.get_closure("B")), ["B"]);
        assert_eq!(names(&dg.get_closure("C")), ["C"]);
        assert_eq!(dg.get_parents("B"), ["A"]);
        assert!(dg.get_parents("A").is_empty());
        assert!(dg.get_closure("missing").is_empty());
    }

    #[test]
    fn test_tool_closure_is_independent() {
        let mut tool = project("tool", &[]);
        tool.restore_metadata.project_style = ProjectStyle::DotnetCliTool;
        let dg = graph(vec![project("A", &["B"]), project("B", &[]), tool]);

        assert_eq!(names(&dg.get_closure("tool")), ["tool"]);
        assert!(!names(&dg.get_closure("A")).contains(&"tool".to_string()));
    }

    #[test]
    fn test_closure_survives_cycles() {
        let dg = graph(vec![project("A", &["B"]), project("B", &["C"]), project("C", &["A"])]);
        assert_eq!(names(&dg.get_closure("B")), ["A", "B", "C"]);
    }

    #[test]
    fn test_add_project_and_restore_are_idempotent() {
        let mut dg = graph(vec![project("A", &[])]);
        let mut replacement = project("A", &[]);
        replacement.title = Some("second".into());
        dg.add_project(replacement);
        dg.add_restore("A");
        dg.add_restore("A");

        assert_eq!(dg.project_count(), 1);
        assert!(dg.get_project_spec("A").unwrap().title.is_none());
        assert_eq!(dg.restore().count(), 1);
    }

    #[test]
    fn test_insensitive_lookup() {
        let mut dg = DependencyGraphSpec::with_comparer(PathComparer::Insensitive);
        dg.add_project(project("Alpha", &[]));
        dg.add_restore("ALPHA");
        dg.add_restore("alpha");
        assert!(dg.get_project_spec("alpha").is_some());
        assert_eq!(dg.restore().collect::<Vec<_>>(), ["ALPHA"]);
    }

    #[test]
    fn test_remove_missing_projects() {
        let mut dg = graph(vec![project("A", &["B", "ghost"]), project("B", &[])]);
        dg.remove_missing_projects();

        let a = dg.get_project_spec("A").unwrap();
        let refs: Vec<_> = a
            .restore_metadata
            .project_references()
            .map(|r| r.project_unique_name.as_str())
            .collect();
        assert_eq!(refs, ["B"]);
        assert_eq!(names(&dg.get_closure("A")), ["A", "B"]);
    }

    #[test]
    fn test_normalize_path_casings() {
        let mut a = project("A", &[]);
        a.restore_metadata.target_frameworks[0]
            .project_references
            .push(ProjectRestoreReference::new("/SRC/b/B.csproj", "/SRC/b/B.csproj"));
        let mut b = project("B", &[]);
        b.restore_metadata.project_unique_name = "/src/b/b.csproj".into();
        b.restore_metadata.project_path = "/src/b/b.csproj".into();

        let mut dg = DependencyGraphSpec::with_comparer(PathComparer::Insensitive);
        dg.add_project(a);
        dg.add_project(b);
        let table = dg.casing_table();
        dg.normalize_path_casings(&table);

        let reference = &dg.get_project_spec("A").unwrap().restore_metadata.target_frameworks[0]
            .project_references[0];
        assert_eq!(reference.project_path, "/src/b/b.csproj");
        assert_eq!(reference.project_unique_name, "/src/b/b.csproj");
    }

    #[test]
    fn test_with_project_closure() {
        let mut dg = graph(vec![project("A", &["B"]), project("B", &[]), project("C", &[])]);
        dg.add_restore("A");
        dg.add_restore("C");

        let closure = dg.with_project_closure("A");
        assert_eq!(closure.project_count(), 2);
        assert_eq!(closure.restore().collect::<Vec<_>>(), ["A"]);
    }

    #[test]
    fn test_with_replaced_spec_and_merge() {
        let dg = graph(vec![project("A", &[]), project("B", &[])]);
        let mut changed = project("A", &[]);
        changed.title = Some("new".into());
        let replaced = dg.with_replaced_spec(changed);
        assert_eq!(replaced.get_project_spec("A").unwrap().title.as_deref(), Some("new"));
        assert!(dg.get_project_spec("A").unwrap().title.is_none());

        let mut merged = graph(vec![project("C", &[])]);
        merged.add_restore("C");
        merged.merge(&replaced);
        assert_eq!(merged.project_count(), 3);
        assert_eq!(merged.restore().count(), 1);
    }

    #[test]
    fn test_sort_by_dependency_order() {
        let dg = graph(vec![
            project("App", &["Lib", "Core"]),
            project("Lib", &["Core"]),
            project("Core", &[]),
        ]);
        let order: Vec<_> = dg.sort_by_dependency_order().iter().map(|s| s.name.clone()).collect();
        assert_eq!(order, ["Core", "Lib", "App"]);
    }

    #[test]
    fn test_sort_breaks_cycles_by_name() {
        let dg = graph(vec![project("Y", &["X"]), project("X", &["Y"]), project("Z", &["X"])]);
        let order: Vec<_> = dg.sort_by_dependency_order().iter().map(|s| s.name.clone()).collect();
        assert_eq!(order, ["X", "Y", "Z"]);
    }

    proptest! {
        #[test]
        fn prop_closure_is_reachable_set(
            edges in proptest::collection::vec((0usize..8, 0usize..8), 0..20),
            start in 0usize..8,
        ) {
            let name = |i: usize| format!("P{i}");
            let projects = (0..8)
                .map(|i| {
                    let refs: Vec<String> = edges
                        .iter()
                        .filter(|(from, _)| *from == i)
                        .map(|(_, to)| name(*to))
                        .collect();
                    let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
                    project(&name(i), &refs)
                })
                .collect::<Vec<_>>();

            // Adding projects in reverse must not change the closure.
            let forward = graph(projects.clone());
            let backward = graph(projects.into_iter().rev().collect());

            let mut reachable = std::collections::BTreeSet::from([start]);
            loop {
                let next: std::collections::BTreeSet<usize> = edges
                    .iter()
                    .filter(|(from, _)| reachable.contains(from))
                    .map(|(_, to)| *to)
                    .chain(reachable.iter().copied())
                    .collect();
                if next == reachable {
                    break;
                }
                reachable = next;
            }
            let mut expected: Vec<String> = reachable.into_iter().map(name).collect();
            expected.sort();

            prop_assert_eq!(names(&forward.get_closure(&name(start))), expected.clone());
            prop_assert_eq!(names(&backward.get_closure(&name(start))), expected);
        }
    }
}
