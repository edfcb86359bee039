//! Runtime identifier graph declared by a project.

use indexmap::IndexMap;

use crate::core::framework::NuGetFramework;

/// A runtime identifier and the runtimes it inherits from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeDescription {
    pub runtime_identifier: String,
    pub inherited_runtimes: Vec<String>,
}

impl RuntimeDescription {
    pub fn new(runtime_identifier: impl Into<String>) -> Self {
        RuntimeDescription {
            runtime_identifier: runtime_identifier.into(),
            inherited_runtimes: Vec::new(),
        }
    }
}

/// A framework and runtime pair that a compatibility profile must support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkRuntimePair {
    pub framework: NuGetFramework,
    pub runtime_identifier: String,
}

/// A named set of framework/runtime pairs checked during restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityProfile {
    pub name: String,
    pub restore_contexts: Vec<FrameworkRuntimePair>,
}

impl CompatibilityProfile {
    pub fn new(name: impl Into<String>) -> Self {
        CompatibilityProfile {
            name: name.into(),
            restore_contexts: Vec::new(),
        }
    }
}

/// Runtimes and supports profiles, keyed by name in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeGraph {
    pub runtimes: IndexMap<String, RuntimeDescription>,
    pub supports: IndexMap<String, CompatibilityProfile>,
}

impl RuntimeGraph {
    /// Build a graph from runtime identifiers and supports profile names.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn from_names<'a>(
        runtimes: impl IntoIterator<Item = &'a str>,
        supports: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut graph = RuntimeGraph::default();
        for rid in runtimes {
            graph
                .runtimes
                .entry(rid.to_string())
                .or_insert_with(|| RuntimeDescription::new(rid));
        }
        for profile in supports {
            graph
                .supports
                .entry(profile.to_string())
                .or_insert_with(|| CompatibilityProfile::new(profile));
        }
        graph
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty() && self.supports.is_empty()
    }
}
