//! The per-project restore specification.
//!
//! A [`PackageSpec`] is the normalized view of one project: its frameworks and
//! their dependencies, restore metadata, runtime graph, and the pack fields
//! carried over from the project file.

use std::path::Path;

use indexmap::IndexMap;

use crate::core::dependency::{
    CentralPackageVersion, DownloadDependency, FrameworkDependency, LibraryDependency,
};
use crate::core::framework::NuGetFramework;
use crate::core::restore_metadata::ProjectRestoreMetadata;
use crate::core::runtime::RuntimeGraph;
use crate::core::version::NuGetVersion;

/// Dependencies and settings for one target framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFrameworkInformation {
    pub framework_name: NuGetFramework,
    pub target_alias: String,
    pub dependencies: Vec<LibraryDependency>,
    pub central_package_versions: IndexMap<String, CentralPackageVersion>,
    pub download_dependencies: Vec<DownloadDependency>,
    pub framework_references: Vec<FrameworkDependency>,
    pub runtime_identifier_graph_path: Option<String>,
    pub imports: Vec<NuGetFramework>,
    pub asset_target_fallback: bool,
    pub warn: bool,
}

impl TargetFrameworkInformation {
    pub fn new(framework_name: NuGetFramework) -> Self {
        TargetFrameworkInformation {
            framework_name,
            target_alias: String::new(),
            dependencies: Vec::new(),
            central_package_versions: IndexMap::new(),
            download_dependencies: Vec::new(),
            framework_references: Vec::new(),
            runtime_identifier_graph_path: None,
            imports: Vec::new(),
            asset_target_fallback: false,
            warn: false,
        }
    }

    /// Look up a central pin by package id, ignoring case.
    pub fn central_version(&self, name: &str) -> Option<&CentralPackageVersion> {
        self.central_package_versions
            .get(name)
            .or_else(|| {
                self.central_package_versions
                    .values()
                    .find(|cpv| cpv.name.eq_ignore_ascii_case(name))
            })
    }

    /// Record a central pin unless one already exists for the id.
    pub fn add_central_version(&mut self, pin: CentralPackageVersion) {
        if self.central_version(&pin.name).is_none() {
            self.central_package_versions.insert(pin.name.clone(), pin);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackOptions {
    pub package_type: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildOptions {
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestoreSettings {
    pub hide_warnings_and_errors: bool,
}

/// One project's restore specification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageSpec {
    pub name: String,
    pub file_path: String,
    pub version: NuGetVersion,
    pub title: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub owners: Vec<String>,
    pub tags: Vec<String>,
    pub copyright: Option<String>,
    pub language: Option<String>,
    pub release_notes: Option<String>,
    pub require_license_acceptance: bool,
    pub pack_options: PackOptions,
    pub scripts: IndexMap<String, Vec<String>>,
    pub build_options: BuildOptions,
    pub restore_settings: RestoreSettings,
    /// Dependencies that apply to every framework.
    pub dependencies: Vec<LibraryDependency>,
    pub target_frameworks: Vec<TargetFrameworkInformation>,
    pub restore_metadata: ProjectRestoreMetadata,
    pub runtime_graph: RuntimeGraph,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>) -> Self {
        PackageSpec {
            name: name.into(),
            ..PackageSpec::default()
        }
    }

    /// The unique name used to key this project in a graph: the restore
    /// metadata's unique name, or the spec name when that is blank.
    pub fn unique_name(&self) -> &str {
        if self.restore_metadata.project_unique_name.is_empty() {
            &self.name
        } else {
            &self.restore_metadata.project_unique_name
        }
    }

    pub fn framework(&self, framework: &NuGetFramework) -> Option<&TargetFrameworkInformation> {
        self.target_frameworks
            .iter()
            .find(|tfi| &tfi.framework_name == framework)
    }

    pub fn framework_mut(
        &mut self,
        framework: &NuGetFramework,
    ) -> Option<&mut TargetFrameworkInformation> {
        self.target_frameworks
            .iter_mut()
            .find(|tfi| &tfi.framework_name == framework)
    }

    /// Add a framework unless one with the same value exists. Returns whether
    /// it was added.
    pub fn add_framework(&mut self, tfi: TargetFrameworkInformation) -> bool {
        if self.framework(&tfi.framework_name).is_some() {
            return false;
        }
        self.target_frameworks.push(tfi);
        true
    }

    /// Fill blank `name` and `file_path` from the restore metadata.
    ///
    /// Name falls back to the project name, then the unique name, then the
    /// file stem of the project path. File path falls back from the project
    /// path to the `project.json` path.
    pub fn apply_identity_fallbacks(&mut self) {
        if self.file_path.is_empty() {
            self.file_path = self.fallback_file_path();
        }
        if self.name.is_empty() {
            self.name = self.fallback_name();
        }
    }

    /// The file path implied by the restore metadata.
    pub fn fallback_file_path(&self) -> String {
        let meta = &self.restore_metadata;
        if !meta.project_path.is_empty() {
            meta.project_path.clone()
        } else {
            meta.project_json_path.clone().unwrap_or_default()
        }
    }

    /// The name implied by the restore metadata and file path.
    pub fn fallback_name(&self) -> String {
        let meta = &self.restore_metadata;
        if !meta.project_name.is_empty() {
            meta.project_name.clone()
        } else if !meta.project_unique_name.is_empty() {
            meta.project_unique_name.clone()
        } else {
            file_stem(&self.file_path)
        }
    }
}

fn file_stem(path: &str) -> String {
    // Project paths may come from Windows hosts; accept either separator.
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
