//! Building a [`DependencyGraphSpec`] from build items.
//!
//! Items are grouped by their `ProjectUniqueName` property. Each group holds
//! one `projectSpec` item describing the project plus the references,
//! dependencies and framework groups that belong to it. `restorespec` items
//! name the restore roots.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;

use crate::core::dependency::{
    CentralPackageVersion, DownloadDependency, FrameworkDependency, LibraryDependency,
    LibraryRange,
};
use crate::core::flags::{FrameworkDependencyFlags, LibraryIncludeFlags};
use crate::core::framework::NuGetFramework;
use crate::core::graph_spec::{DependencyGraphSpec, PathComparer};
use crate::core::log_code::LogCode;
use crate::core::package_spec::{PackageSpec, TargetFrameworkInformation};
use crate::core::restore_metadata::{
    ProjectRestoreMetadata, ProjectRestoreMetadataFrameworkInfo, ProjectRestoreReference,
    ProjectStyle, RestoreLockProperties, WarningProperties,
};
use crate::core::runtime::RuntimeGraph;
use crate::core::version::{NuGetVersion, VersionRange};
use crate::json::{read_package_spec_file, FileFormatError};
use crate::msbuild::central::{find_violations, pin_dependencies, CentralVersions};
use crate::msbuild::errors::BuildError;
use crate::msbuild::item::MsBuildItem;
use crate::msbuild::strings::{fix_source_path, handle_clear, has_invalid_clear, is_true, split};

/// `SolutionDir` value when building a project outside a solution.
const UNDEFINED_SOLUTION_DIR: &str = "*Undefined*";

/// Item types carrying per-framework properties.
const FRAMEWORK_ITEM_TYPES: &[&str] = &["TargetFrameworkInformation", "TargetFrameworkProperties"];

/// Options for [`build_graph_spec_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// How project unique names and paths compare.
    pub comparer: PathComparer,
}

impl BuildOptions {
    pub fn with_comparer(mut self, comparer: PathComparer) -> Self {
        self.comparer = comparer;
        self
    }
}

/// Build a graph spec from items, comparing paths the way the host does.
pub fn build_graph_spec<I: MsBuildItem>(items: &[I]) -> Result<DependencyGraphSpec, BuildError> {
    build_graph_spec_with(items, &BuildOptions::default())
}

/// Build a graph spec from items.
pub fn build_graph_spec_with<I: MsBuildItem>(
    items: &[I],
    options: &BuildOptions,
) -> Result<DependencyGraphSpec, BuildError> {
    let comparer = options.comparer;
    let mut restore_specs: Vec<&str> = Vec::new();
    let mut buckets: IndexMap<String, Vec<&I>> = IndexMap::new();

    for item in items {
        let Some(unique_name) = item.property("ProjectUniqueName") else {
            continue;
        };
        if item.is_type("restorespec") {
            restore_specs.push(unique_name);
        } else {
            buckets.entry(comparer.key(unique_name)).or_default().push(item);
        }
    }

    let mut graph = DependencyGraphSpec::with_comparer(comparer);
    let mut restorable: HashSet<String> = HashSet::new();
    for bucket in buckets.values() {
        let Some(spec) = ProjectItems::new(bucket, comparer).map(|p| p.build()).transpose()? else {
            continue;
        };
        if spec.restore_metadata.project_style.is_restorable() {
            restorable.insert(comparer.key(spec.unique_name()));
        }
        graph.add_project(spec);
    }

    if comparer.is_case_insensitive() {
        let table = graph.casing_table();
        graph.normalize_path_casings(&table);
    }
    graph.remove_missing_projects();

    for name in restore_specs {
        if restorable.contains(&comparer.key(name)) {
            graph.add_restore(name);
        } else {
            tracing::debug!("skipping restore root {}: not a restorable project", name);
        }
    }

    Ok(graph)
}

/// The items of one project.
struct ProjectItems<'a, I> {
    spec_item: &'a I,
    items: &'a [&'a I],
    unique_name: &'a str,
    comparer: PathComparer,
}

impl<'a, I: MsBuildItem> ProjectItems<'a, I> {
    /// `None` when the group has no `projectSpec` item.
    fn new(items: &'a [&'a I], comparer: PathComparer) -> Option<Self> {
        let mut specs = items.iter().copied().filter(|item| item.is_type("projectSpec"));
        let spec_item = specs.next()?;
        if specs.next().is_some() {
            tracing::debug!(
                "multiple projectSpec items for {}, using the first",
                spec_item.identity()
            );
        }
        Some(ProjectItems {
            spec_item,
            items,
            unique_name: spec_item.property("ProjectUniqueName").unwrap_or_default(),
            comparer,
        })
    }

    fn property(&self, key: &str) -> Option<&'a str> {
        self.spec_item.property(key)
    }

    fn of_type(&self, item_type: &'a str) -> impl Iterator<Item = &'a I> + 'a {
        let items = self.items;
        items.iter().copied().filter(move |item| item.is_type(item_type))
    }

    /// A property of a framework group, falling back to the project.
    fn framework_property(&self, alias: &str, key: &str) -> Option<&'a str> {
        let items = self.items;
        items
            .iter()
            .copied()
            .filter(|item| FRAMEWORK_ITEM_TYPES.iter().any(|t| item.is_type(t)))
            .filter(|item| {
                item.property("TargetFramework")
                    .is_some_and(|tf| tf.eq_ignore_ascii_case(alias))
            })
            .find_map(|item| item.property(key))
            .or_else(|| self.property(key))
    }

    /// A `;` list that may be reset with `clear`.
    fn list_property(&self, key: &str) -> Result<Vec<String>, BuildError> {
        let values = split(self.property(key));
        if has_invalid_clear(&values) {
            return Err(BuildError::InvalidClear {
                project: self.unique_name.to_string(),
                property: key.to_string(),
            });
        }
        Ok(handle_clear(values))
    }

    fn invalid_version(&self, property: &str, value: &str) -> BuildError {
        BuildError::InvalidVersion {
            project: self.unique_name.to_string(),
            property: property.to_string(),
            value: value.to_string(),
        }
    }

    fn parse_range(&self, value: &str) -> Result<VersionRange, BuildError> {
        VersionRange::parse(value).map_err(|_| self.invalid_version("VersionRange", value))
    }

    fn build(&self) -> Result<PackageSpec, BuildError> {
        let style = ProjectStyle::parse(self.property("ProjectStyle").unwrap_or_default());
        let central_enabled = style == ProjectStyle::PackageReference
            && is_true(self.property("CentralPackageVersionsEnabled"));

        let mut spec = if style == ProjectStyle::ProjectJson {
            self.read_project_json()?
        } else {
            let mut spec = PackageSpec::default();
            for tfi in self.target_frameworks(style) {
                spec.add_framework(tfi);
            }
            let project_name = self.property("ProjectName").unwrap_or_default();
            spec.name = project_name.to_string();
            spec.file_path = self.property("ProjectPath").unwrap_or_default().to_string();
            spec.restore_metadata.project_name = project_name.to_string();
            spec
        };

        let meta = &mut spec.restore_metadata;
        meta.project_style = style;
        meta.project_path = self.property("ProjectPath").unwrap_or_default().to_string();
        meta.project_unique_name = self.unique_name.to_string();
        meta.central_package_versions_enabled = central_enabled;
        spec.apply_identity_fallbacks();

        self.add_project_references(&mut spec);

        if style.is_restorable() {
            let meta = &mut spec.restore_metadata;
            meta.output_path = self.property("OutputPath").map(str::to_string);
            meta.packages_path = self.property("PackagesPath").map(str::to_string);
            // Sources are written as object keys, so keep each one once.
            let mut sources: Vec<String> = Vec::new();
            for source in self.list_property("Sources")? {
                let source = fix_source_path(&source);
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
            meta.sources = sources;
            meta.fallback_folders = self.list_property("FallbackFolders")?;
            meta.config_file_paths = split(self.property("ConfigFilePaths"));
        }

        if style.consumes_packages() {
            self.add_package_references(&mut spec, central_enabled)?;
            self.add_download_dependencies(&mut spec)?;
            self.add_framework_references(&mut spec);
            spec.restore_metadata.original_target_frameworks = spec
                .target_frameworks
                .iter()
                .map(|tfi| tfi.target_alias.clone())
                .collect();
        }

        if style.has_package_semantics() {
            spec.version = match self.property("Version") {
                Some(value) => NuGetVersion::parse(value)
                    .map_err(|_| self.invalid_version("Version", value))?,
                None => NuGetVersion::default(),
            };
            spec.runtime_graph = RuntimeGraph::from_names(
                split(self.property("RuntimeIdentifiers")).iter().map(String::as_str),
                split(self.property("RuntimeSupports")).iter().map(String::as_str),
            );
            for tfi in &mut spec.target_frameworks {
                self.apply_framework_properties(tfi)?;
            }

            let meta = &mut spec.restore_metadata;
            meta.cross_targeting = is_true(self.property("CrossTargeting"));
            meta.legacy_packages_directory = is_true(self.property("RestoreLegacyPackagesDirectory"));
            meta.validate_runtime_assets = is_true(self.property("ValidateRuntimeAssets"))
                || is_true(self.property("ValidateRuntimeIdentifierCompatibility"));
            meta.skip_content_file_write = is_true(self.property("SkipContentFileWrite"));
            meta.project_wide_warning_properties = WarningProperties::from_properties(
                self.property("TreatWarningsAsErrors"),
                self.property("WarningsAsErrors"),
                self.property("NoWarn"),
                self.property("WarningsNotAsErrors"),
            );
            meta.restore_lock_properties = RestoreLockProperties {
                restore_packages_with_lock_file: self
                    .property("RestorePackagesWithLockFile")
                    .map(str::to_string),
                nuget_lock_file_path: self.property("NuGetLockFilePath").map(str::to_string),
                restore_locked_mode: is_true(self.property("RestoreLockedMode")),
            };
        }

        if style == ProjectStyle::PackagesConfig {
            let meta = &mut spec.restore_metadata;
            meta.packages_config_path = self.property("PackagesConfigPath").map(str::to_string);
            meta.repository_path = self
                .property("RepositoryPath")
                .map(str::to_string)
                .or_else(|| {
                    self.property("SolutionDir")
                        .filter(|dir| *dir != UNDEFINED_SOLUTION_DIR)
                        .map(|dir| Path::new(dir).join("packages").display().to_string())
                });
        }

        if style == ProjectStyle::ProjectJson {
            spec.restore_metadata.validate_runtime_assets = true;
        }

        Ok(spec)
    }

    /// Read the `project.json` file; build items only add identity.
    fn read_project_json(&self) -> Result<PackageSpec, BuildError> {
        let project_json_error = |source: FileFormatError| BuildError::ProjectJson {
            project: self.unique_name.to_string(),
            source,
        };
        let path = self
            .property("ProjectJsonPath")
            .ok_or_else(|| project_json_error(FileFormatError::new("ProjectJsonPath is not set")))?;
        let project_name = self.property("ProjectName");

        let mut spec =
            read_package_spec_file(Path::new(path), project_name).map_err(project_json_error)?;
        spec.restore_metadata = ProjectRestoreMetadata {
            project_json_path: Some(path.to_string()),
            project_name: project_name.unwrap_or_default().to_string(),
            ..ProjectRestoreMetadata::default()
        };
        Ok(spec)
    }

    /// One framework per `TargetFrameworks` entry. Without that property the
    /// framework groups are used, and tool projects may name a single
    /// framework of their own.
    fn target_frameworks(&self, style: ProjectStyle) -> Vec<TargetFrameworkInformation> {
        let mut aliases = split(self.property("TargetFrameworks"));
        if aliases.is_empty() {
            for item in self.items {
                if FRAMEWORK_ITEM_TYPES.iter().any(|t| item.is_type(t)) {
                    if let Some(alias) = item.property("TargetFramework") {
                        if !aliases.iter().any(|a| a.eq_ignore_ascii_case(alias)) {
                            aliases.push(alias.to_string());
                        }
                    }
                }
            }
        }
        if aliases.is_empty() && style == ProjectStyle::DotnetCliTool {
            aliases.extend(self.property("DotnetCliToolTargetFramework").map(str::to_string));
        }

        aliases
            .into_iter()
            .map(|alias| {
                let mut tfi = TargetFrameworkInformation::new(parse_framework(&alias));
                tfi.target_alias = alias;
                tfi
            })
            .collect()
    }

    /// Framework specific fallbacks and runtime graph path.
    fn apply_framework_properties(&self, tfi: &mut TargetFrameworkInformation) -> Result<(), BuildError> {
        let alias = tfi.target_alias.clone();
        tfi.runtime_identifier_graph_path = self
            .framework_property(&alias, "RuntimeIdentifierGraphPath")
            .map(str::to_string);

        let package_fallback = split(self.framework_property(&alias, "PackageTargetFallback"));
        let asset_fallback = split(self.framework_property(&alias, "AssetTargetFallback"));
        if !package_fallback.is_empty() && !asset_fallback.is_empty() {
            return Err(BuildError::FallbackConflict {
                project: self.unique_name.to_string(),
                framework: if alias.is_empty() {
                    tfi.framework_name.short_folder_name()
                } else {
                    alias
                },
            });
        }
        if !asset_fallback.is_empty() {
            tfi.imports = asset_fallback.iter().map(|f| parse_framework(f)).collect();
            tfi.asset_target_fallback = true;
            tfi.warn = true;
        } else if !package_fallback.is_empty() {
            tfi.imports = package_fallback.iter().map(|f| parse_framework(f)).collect();
        }
        Ok(())
    }

    /// One reference group per project framework, even when empty.
    fn add_project_references(&self, spec: &mut PackageSpec) {
        let mut groups: Vec<ProjectRestoreMetadataFrameworkInfo> = spec
            .target_frameworks
            .iter()
            .map(|tfi| {
                let mut info = ProjectRestoreMetadataFrameworkInfo::new(tfi.framework_name.clone());
                info.target_alias = tfi.target_alias.clone();
                info
            })
            .collect();

        for item in self.of_type("ProjectReference") {
            let Some(reference_name) = item.property("ProjectReferenceUniqueName") else {
                continue;
            };
            let frameworks = split(item.property("TargetFrameworks"));
            for group in &mut groups {
                if !applies_to(&frameworks, &group.target_alias, &group.framework) {
                    continue;
                }
                let exists = group
                    .project_references
                    .iter()
                    .any(|r| self.comparer.eq(&r.project_unique_name, reference_name));
                if exists {
                    continue;
                }
                let mut reference = ProjectRestoreReference::new(
                    reference_name,
                    item.property("ProjectPath").unwrap_or_default(),
                );
                reference.include_assets =
                    LibraryIncludeFlags::parse_or(item.property("IncludeAssets"), LibraryIncludeFlags::all());
                reference.exclude_assets =
                    LibraryIncludeFlags::parse_or(item.property("ExcludeAssets"), LibraryIncludeFlags::empty());
                reference.private_assets = LibraryIncludeFlags::parse_or(
                    item.property("PrivateAssets"),
                    LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT,
                );
                group.project_references.push(reference);
            }
        }

        spec.restore_metadata.target_frameworks = groups;
    }

    fn read_dependency(&self, item: &I, central_enabled: bool) -> Result<Option<LibraryDependency>, BuildError> {
        let Some(name) = item_id(item) else {
            return Ok(None);
        };
        let version_range = match item.property("VersionRange") {
            Some(value) => Some(self.parse_range(value)?),
            // Left unset for central pins to fill in.
            None if central_enabled => None,
            None => Some(VersionRange::all()),
        };

        let mut dependency = LibraryDependency::new(LibraryRange::package(name, version_range))
            .with_assets(
                LibraryIncludeFlags::parse_or(item.property("IncludeAssets"), LibraryIncludeFlags::all()),
                LibraryIncludeFlags::parse_or(item.property("ExcludeAssets"), LibraryIncludeFlags::empty()),
            )
            .with_suppress_parent(LibraryIncludeFlags::parse_or(
                item.property("PrivateAssets"),
                LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT,
            ));
        dependency.no_warn = item
            .property("NoWarn")
            .map(LogCode::parse_list)
            .unwrap_or_default()
            .into_iter()
            .collect();
        dependency.auto_referenced = is_true(item.property("IsImplicitlyDefined"));
        dependency.generate_path_property = is_true(item.property("GeneratePathProperty"));
        dependency.aliases = item.property("Aliases").map(str::to_string);
        Ok(Some(dependency))
    }

    /// `Dependency` items without frameworks are project wide; the rest go to
    /// the frameworks they name. The first declaration of a package wins.
    fn add_package_references(&self, spec: &mut PackageSpec, central_enabled: bool) -> Result<(), BuildError> {
        for item in self.of_type("Dependency") {
            let Some(dependency) = self.read_dependency(item, central_enabled)? else {
                continue;
            };
            let frameworks = split(item.property("TargetFrameworks"));
            if frameworks.is_empty() {
                add_dependency_if_missing(&mut spec.dependencies, dependency);
                continue;
            }
            for tfi in &mut spec.target_frameworks {
                if applies_to(&frameworks, &tfi.target_alias, &tfi.framework_name) {
                    add_dependency_if_missing(&mut tfi.dependencies, dependency.clone());
                }
            }
        }

        if central_enabled {
            self.merge_central_versions(spec)?;
        }
        Ok(())
    }

    fn merge_central_versions(&self, spec: &mut PackageSpec) -> Result<(), BuildError> {
        let mut project_pins = CentralVersions::new();
        let mut framework_pins: Vec<CentralVersions> =
            vec![CentralVersions::new(); spec.target_frameworks.len()];

        for item in self.of_type("CentralVersionDependency") {
            let Some(name) = item_id(item) else {
                continue;
            };
            let value = item.property("VersionRange").unwrap_or_default();
            let pin = CentralPackageVersion::new(name, self.parse_range(value)?);
            let frameworks = split(item.property("TargetFrameworks"));
            if frameworks.is_empty() {
                project_pins.insert(pin);
                continue;
            }
            for (tfi, pins) in spec.target_frameworks.iter().zip(&mut framework_pins) {
                if applies_to(&frameworks, &tfi.target_alias, &tfi.framework_name) {
                    pins.insert(pin.clone());
                }
            }
        }

        let violations = find_violations(
            spec.dependencies
                .iter()
                .chain(spec.target_frameworks.iter().flat_map(|tfi| &tfi.dependencies)),
        );
        if !violations.is_empty() {
            return Err(BuildError::CentralVersionViolation {
                project: self.unique_name.to_string(),
                packages: violations,
            });
        }

        // Pins anywhere in the project put every reference under central
        // management.
        if project_pins.is_empty() && framework_pins.iter().all(CentralVersions::is_empty) {
            return Ok(());
        }
        pin_dependencies(&mut spec.dependencies, &project_pins);
        for (tfi, mut pins) in spec.target_frameworks.iter_mut().zip(framework_pins) {
            pins.extend_from(&project_pins);
            pin_dependencies(&mut tfi.dependencies, &pins);
            for pin in pins.iter() {
                tfi.add_central_version(pin.clone());
            }
        }
        Ok(())
    }

    /// Download dependencies must name exact versions. Several versions may
    /// be given as a `;` list.
    fn add_download_dependencies(&self, spec: &mut PackageSpec) -> Result<(), BuildError> {
        let mut inexact: Vec<String> = Vec::new();

        for item in self.of_type("DownloadDependency") {
            let Some(name) = item_id(item) else {
                continue;
            };
            let versions = split(item.property("VersionRange"));
            if versions.is_empty() {
                inexact.push(name.to_string());
                continue;
            }
            let frameworks = split(item.property("TargetFrameworks"));
            for value in &versions {
                let range = self.parse_range(value)?;
                if range.exact_version().is_none() {
                    inexact.push(format!("{} {}", name, value));
                    continue;
                }
                let download = DownloadDependency::new(name, range);
                for tfi in &mut spec.target_frameworks {
                    if !applies_to(&frameworks, &tfi.target_alias, &tfi.framework_name) {
                        continue;
                    }
                    let exists = tfi.download_dependencies.iter().any(|d| {
                        d.name.eq_ignore_ascii_case(&download.name) && d.version_range == download.version_range
                    });
                    if !exists {
                        tfi.download_dependencies.push(download.clone());
                    }
                }
            }
        }

        if inexact.is_empty() {
            Ok(())
        } else {
            inexact.dedup();
            Err(BuildError::NonExactDownloadVersion {
                project: self.unique_name.to_string(),
                packages: inexact,
            })
        }
    }

    fn add_framework_references(&self, spec: &mut PackageSpec) {
        for item in self.of_type("FrameworkReference") {
            let Some(name) = item_id(item) else {
                continue;
            };
            let private_assets = FrameworkDependencyFlags::parse(item.property("PrivateAssets").unwrap_or_default());
            let frameworks = split(item.property("TargetFrameworks"));
            for tfi in &mut spec.target_frameworks {
                if !applies_to(&frameworks, &tfi.target_alias, &tfi.framework_name) {
                    continue;
                }
                if !tfi.framework_references.iter().any(|f| f.name.eq_ignore_ascii_case(name)) {
                    tfi.framework_references.push(FrameworkDependency::new(name, private_assets));
                }
            }
        }
    }
}

/// The package id of an item: its `Id` property, or its identity.
fn item_id<I: MsBuildItem>(item: &I) -> Option<&str> {
    item.property("Id").or_else(|| {
        let identity = item.identity().trim();
        (!identity.is_empty()).then_some(identity)
    })
}

/// Unknown monikers become the unsupported framework.
fn parse_framework(value: &str) -> NuGetFramework {
    NuGetFramework::parse(value).unwrap_or_else(|_| {
        tracing::debug!("unrecognized framework '{}'", value);
        NuGetFramework::unsupported()
    })
}

/// Whether an item restricted to `frameworks` applies to a framework. An
/// empty list applies everywhere.
fn applies_to(frameworks: &[String], alias: &str, framework: &NuGetFramework) -> bool {
    frameworks.is_empty()
        || frameworks.iter().any(|f| {
            f.eq_ignore_ascii_case(alias)
                || NuGetFramework::parse(f).is_ok_and(|parsed| &parsed == framework)
        })
}

fn add_dependency_if_missing(dependencies: &mut Vec<LibraryDependency>, dependency: LibraryDependency) {
    if !dependencies.iter().any(|d| d.same_library(&dependency)) {
        dependencies.push(dependency);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msbuild::item::PropertyItem;
    use tempfile::TempDir;

    fn options() -> BuildOptions {
        BuildOptions::default().with_comparer(PathComparer::Sensitive)
    }

    fn restore_spec(name: &str) -> PropertyItem {
        PropertyItem::of_type("restorespec", name).with("ProjectUniqueName", name)
    }

    fn project(name: &str, style: &str, frameworks: &str) -> PropertyItem {
        PropertyItem::of_type("projectSpec", name)
            .with("ProjectUniqueName", name)
            .with("ProjectPath", name)
            .with("ProjectName", name.trim_end_matches(".csproj").rsplit('/').next().unwrap())
            .with("ProjectStyle", style)
            .with("TargetFrameworks", frameworks)
    }

    fn reference(owner: &str, target: &str) -> PropertyItem {
        PropertyItem::of_type("ProjectReference", target)
            .with("ProjectUniqueName", owner)
            .with("ProjectReferenceUniqueName", target)
            .with("ProjectPath", target)
    }

    fn dependency(owner: &str, id: &str, range: Option<&str>, frameworks: &str) -> PropertyItem {
        let mut item = PropertyItem::of_type("Dependency", id)
            .with("ProjectUniqueName", owner)
            .with("Id", id)
            .with("TargetFrameworks", frameworks);
        if let Some(range) = range {
            item = item.with("VersionRange", range);
        }
        item
    }

    fn build(items: &[PropertyItem]) -> DependencyGraphSpec {
        build_graph_spec_with(items, &options()).unwrap()
    }

    fn names(specs: Vec<&PackageSpec>) -> Vec<String> {
        let mut names: Vec<String> = specs.iter().map(|s| s.unique_name().to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_defaults_for_package_reference_project() {
        let graph = build(&[
            restore_spec("/src/a.csproj"),
            project("/src/a.csproj", "PackageReference", "net6.0;net472"),
        ]);

        let spec = graph.get_project_spec("/src/a.csproj").unwrap();
        assert_eq!(spec.name, "a");
        assert_eq!(spec.file_path, "/src/a.csproj");
        assert_eq!(spec.version.to_string(), "1.0.0");
        assert!(!spec.restore_metadata.cross_targeting);
        assert!(!spec.restore_metadata.legacy_packages_directory);
        assert_eq!(spec.target_frameworks.len(), 2);
        assert_eq!(spec.target_frameworks[1].target_alias, "net472");
        assert_eq!(spec.restore_metadata.original_target_frameworks, ["net6.0", "net472"]);
        // Every framework has a reference group, even an empty one.
        assert_eq!(spec.restore_metadata.target_frameworks.len(), 2);
        assert_eq!(graph.restore().collect::<Vec<_>>(), ["/src/a.csproj"]);
    }

    #[test]
    fn test_project_properties() {
        let graph = build(&[project("/src/a.csproj", "packagereference", "net6.0")
            .with("Version", "2.1.0-beta+sha")
            .with("CrossTargeting", "true")
            .with("RestoreLegacyPackagesDirectory", "True")
            .with("SkipContentFileWrite", "False")
            .with("Sources", "https:/api.nuget.org/v3/index.json;/local/feed")
            .with("FallbackFolders", "/fallback")
            .with("ConfigFilePaths", "/b/NuGet.Config;/a/NuGet.Config")
            .with("RuntimeIdentifiers", "win-x64;linux-x64;win-x64")
            .with("RuntimeSupports", "profile")
            .with("NoWarn", "NU1603;CS0618")
            .with("RestorePackagesWithLockFile", "true")
            .with("RestoreLockedMode", "true")]);

        let spec = graph.get_project_spec("/src/a.csproj").unwrap();
        let meta = &spec.restore_metadata;
        assert_eq!(meta.project_style, ProjectStyle::PackageReference);
        assert_eq!(spec.version.to_string(), "2.1.0-beta+sha");
        assert!(meta.cross_targeting);
        assert!(meta.legacy_packages_directory);
        assert!(!meta.skip_content_file_write);
        assert_eq!(meta.sources, ["https://api.nuget.org/v3/index.json", "/local/feed"]);
        assert_eq!(meta.fallback_folders, ["/fallback"]);
        assert_eq!(meta.config_file_paths, ["/b/NuGet.Config", "/a/NuGet.Config"]);
        assert_eq!(spec.runtime_graph.runtimes.keys().collect::<Vec<_>>(), ["win-x64", "linux-x64"]);
        assert!(spec.runtime_graph.supports.contains_key("profile"));
        assert_eq!(meta.project_wide_warning_properties.no_warn.len(), 1);
        assert_eq!(meta.restore_lock_properties.restore_packages_with_lock_file.as_deref(), Some("true"));
        assert!(meta.restore_lock_properties.restore_locked_mode);
    }

    #[test]
    fn test_unknown_style_is_not_restored() {
        let graph = build(&[
            restore_spec("/src/a.csproj"),
            project("/src/a.csproj", "SomethingNew", "net6.0"),
            // No projectSpec item: the project is skipped.
            restore_spec("/src/b.csproj"),
            dependency("/src/b.csproj", "x", Some("1.0.0"), ""),
        ]);

        let spec = graph.get_project_spec("/src/a.csproj").unwrap();
        assert_eq!(spec.restore_metadata.project_style, ProjectStyle::Unknown);
        assert!(graph.get_project_spec("/src/b.csproj").is_none());
        assert_eq!(graph.restore().count(), 0);
    }

    #[test]
    fn test_first_project_spec_wins() {
        let graph = build(&[
            project("/src/a.csproj", "PackageReference", "net6.0").with("Version", "1.2.3"),
            project("/src/a.csproj", "PackageReference", "net472").with("Version", "9.9.9"),
        ]);
        let spec = graph.get_project_spec("/src/a.csproj").unwrap();
        assert_eq!(spec.version.to_string(), "1.2.3");
        assert_eq!(spec.target_frameworks.len(), 1);
    }

    #[test]
    fn test_invalid_version_is_an_error() {
        let err = build_graph_spec_with(
            &[project("/src/a.csproj", "PackageReference", "net6.0").with("Version", "1.x")],
            &options(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidVersion { ref property, .. } if property == "Version"));

        let err = build_graph_spec_with(
            &[
                project("/src/a.csproj", "PackageReference", "net6.0"),
                dependency("/src/a.csproj", "x", Some("[2.0.0, 1.0.0]"), ""),
            ],
            &options(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidVersion { ref property, .. } if property == "VersionRange"));
    }

    #[test]
    fn test_dependencies_per_framework() {
        let graph = build(&[
            project("/src/a.csproj", "PackageReference", "net6.0;net472"),
            dependency("/src/a.csproj", "Shared", Some("1.0.0"), "")
                .with("IncludeAssets", "Runtime;Compile;Build")
                .with("ExcludeAssets", "Build")
                .with("PrivateAssets", "All")
                .with("NoWarn", "NU1603")
                .with("GeneratePathProperty", "true")
                .with("Aliases", "shared"),
            dependency("/src/a.csproj", "Modern", Some("[2.0.0, )"), "net6.0"),
            dependency("/src/a.csproj", "modern", Some("[3.0.0, )"), "net6.0"),
            dependency("/src/a.csproj", "NoVersion", None, "net472"),
        ]);

        let spec = graph.get_project_spec("/src/a.csproj").unwrap();
        let shared = &spec.dependencies[0];
        assert_eq!(shared.include_type, LibraryIncludeFlags::RUNTIME | LibraryIncludeFlags::COMPILE);
        assert_eq!(shared.suppress_parent, LibraryIncludeFlags::all());
        assert!(shared.no_warn.contains(&LogCode::NU1603));
        assert!(shared.generate_path_property);
        assert_eq!(shared.aliases.as_deref(), Some("shared"));

        let net6 = &spec.target_frameworks[0];
        assert_eq!(net6.dependencies.len(), 1);
        assert_eq!(net6.dependencies[0].version_range().unwrap().to_string(), "[2.0.0, )");
        let net472 = &spec.target_frameworks[1];
        assert!(net472.dependencies[0].version_range().unwrap().is_all());
        assert!(!net472.dependencies[0].version_centrally_managed);
    }

    #[test]
    fn test_central_versions_are_merged() {
        let owner = "/src/a.csproj";
        let graph = build(&[
            project(owner, "PackageReference", "net6.0").with("CentralPackageVersionsEnabled", "true"),
            dependency(owner, "foo", None, "net6.0"),
            dependency(owner, "boom", None, "net6.0").with("IsImplicitlyDefined", "true"),
            dependency(owner, "bar", None, "net6.0"),
            PropertyItem::of_type("CentralVersionDependency", "foo")
                .with("ProjectUniqueName", owner)
                .with("VersionRange", "[1.0.0, )"),
            PropertyItem::of_type("CentralVersionDependency", "boom")
                .with("ProjectUniqueName", owner)
                .with("VersionRange", "[2.0.0, )")
                .with("TargetFrameworks", "net6.0"),
        ]);

        let spec = graph.get_project_spec(owner).unwrap();
        assert!(spec.restore_metadata.central_package_versions_enabled);
        let tfi = &spec.target_frameworks[0];
        let foo = &tfi.dependencies[0];
        assert_eq!(foo.version_range().unwrap().to_string(), "[1.0.0, )");
        assert!(foo.version_centrally_managed);
        let boom = &tfi.dependencies[1];
        assert!(boom.version_range().is_none());
        let bar = &tfi.dependencies[2];
        assert!(bar.version_range().unwrap().is_all());
        assert!(bar.version_centrally_managed);
        // Framework pins first, then project wide ones.
        assert_eq!(
            tfi.central_package_versions.keys().collect::<Vec<_>>(),
            ["boom", "foo"]
        );
    }

    #[test]
    fn test_framework_pins_manage_project_wide_references() {
        let owner = "/src/a.csproj";
        let graph = build(&[
            project(owner, "PackageReference", "net6.0;net472").with("CentralPackageVersionsEnabled", "true"),
            dependency(owner, "bar", None, ""),
            dependency(owner, "baz", None, "net472"),
            PropertyItem::of_type("CentralVersionDependency", "foo")
                .with("ProjectUniqueName", owner)
                .with("VersionRange", "[1.0.0, )")
                .with("TargetFrameworks", "net6.0"),
        ]);

        let spec = graph.get_project_spec(owner).unwrap();
        let bar = &spec.dependencies[0];
        assert!(bar.version_range().unwrap().is_all());
        assert!(bar.version_centrally_managed);
        let baz = &spec.target_frameworks[1].dependencies[0];
        assert!(baz.version_range().unwrap().is_all());
        assert!(baz.version_centrally_managed);
        assert!(spec.target_frameworks[1].central_package_versions.is_empty());
    }

    #[test]
    fn test_central_references_without_pins_are_left_alone() {
        let owner = "/src/a.csproj";
        let graph = build(&[
            project(owner, "PackageReference", "net6.0").with("CentralPackageVersionsEnabled", "true"),
            dependency(owner, "bar", None, ""),
            dependency(owner, "foo", None, "net6.0"),
        ]);

        let spec = graph.get_project_spec(owner).unwrap();
        assert!(spec.dependencies[0].version_range().is_none());
        assert!(!spec.target_frameworks[0].dependencies[0].version_centrally_managed);
    }

    #[test]
    fn test_central_versions_need_package_reference_style() {
        let owner = "/src/a.csproj";
        let graph = build(&[
            project(owner, "Standalone", "net6.0").with("CentralPackageVersionsEnabled", "true"),
            dependency(owner, "foo", None, "net6.0"),
        ]);
        let spec = graph.get_project_spec(owner).unwrap();
        assert!(!spec.restore_metadata.central_package_versions_enabled);
        assert!(spec.target_frameworks[0].dependencies[0].version_range().unwrap().is_all());
    }

    #[test]
    fn test_central_version_violation_lists_every_package() {
        let owner = "/src/a.csproj";
        let err = build_graph_spec_with(
            &[
                project(owner, "PackageReference", "net6.0").with("CentralPackageVersionsEnabled", "True"),
                dependency(owner, "a", Some("1.0.0"), "net6.0"),
                dependency(owner, "b", None, "net6.0"),
                dependency(owner, "c", Some("2.0.0"), ""),
                dependency(owner, "implicit", Some("2.0.0"), "net6.0").with("IsImplicitlyDefined", "true"),
            ],
            &options(),
        )
        .unwrap_err();

        match err {
            BuildError::CentralVersionViolation { packages, .. } => assert_eq!(packages, ["c", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_download_dependencies() {
        let owner = "/src/a.csproj";
        let download = |range: &str| {
            PropertyItem::of_type("DownloadDependency", "tool")
                .with("ProjectUniqueName", owner)
                .with("Id", "tool")
                .with("VersionRange", range)
        };
        let graph = build(&[
            project(owner, "PackageReference", "net6.0"),
            download("[1.0.0];[2.0.0]"),
            download("[1.0.0]"),
        ]);
        let tfi = &graph.get_project_spec(owner).unwrap().target_frameworks[0];
        assert_eq!(tfi.download_dependencies.len(), 2);

        let err = build_graph_spec_with(
            &[project(owner, "PackageReference", "net6.0"), download("1.0.0")],
            &options(),
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(LogCode::NU1011));
    }

    #[test]
    fn test_framework_references() {
        let owner = "/src/a.csproj";
        let graph = build(&[
            project(owner, "PackageReference", "net6.0;net472"),
            PropertyItem::of_type("FrameworkReference", "Microsoft.AspNetCore.App")
                .with("ProjectUniqueName", owner)
                .with("PrivateAssets", "all")
                .with("TargetFrameworks", "net6.0"),
        ]);
        let spec = graph.get_project_spec(owner).unwrap();
        let refs = &spec.target_frameworks[0].framework_references;
        assert_eq!(refs[0].name, "Microsoft.AspNetCore.App");
        assert_eq!(refs[0].private_assets, FrameworkDependencyFlags::ALL);
        assert!(spec.target_frameworks[1].framework_references.is_empty());
    }

    #[test]
    fn test_asset_target_fallback() {
        let owner = "/src/a.csproj";
        let graph = build(&[
            project(owner, "PackageReference", "net6.0;netstandard2.0")
                .with("AssetTargetFallback", "net461;net462"),
            PropertyItem::of_type("TargetFrameworkInformation", "netstandard2.0")
                .with("ProjectUniqueName", owner)
                .with("TargetFramework", "netstandard2.0")
                .with("AssetTargetFallback", "net45")
                .with("RuntimeIdentifierGraphPath", "/sdk/RuntimeIdentifierGraph.json"),
        ]);
        let spec = graph.get_project_spec(owner).unwrap();
        let net6 = &spec.target_frameworks[0];
        assert!(net6.asset_target_fallback && net6.warn);
        assert_eq!(net6.imports.len(), 2);
        assert!(net6.runtime_identifier_graph_path.is_none());
        let netstandard = &spec.target_frameworks[1];
        assert_eq!(netstandard.imports, [NuGetFramework::parse("net45").unwrap()]);
        assert_eq!(
            netstandard.runtime_identifier_graph_path.as_deref(),
            Some("/sdk/RuntimeIdentifierGraph.json")
        );
    }

    #[test]
    fn test_package_target_fallback_conflict() {
        let err = build_graph_spec_with(
            &[project("/src/a.csproj", "PackageReference", "net6.0")
                .with("PackageTargetFallback", "dnxcore50")
                .with("AssetTargetFallback", "net461")],
            &options(),
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(LogCode::NU1003));

        let graph = build(&[project("/src/a.csproj", "PackageReference", "net6.0")
            .with("PackageTargetFallback", "dnxcore50")]);
        let tfi = &graph.get_project_spec("/src/a.csproj").unwrap().target_frameworks[0];
        assert!(!tfi.asset_target_fallback);
        assert_eq!(tfi.imports.len(), 1);
    }

    #[test]
    fn test_repeated_sources_are_kept_once() {
        let graph = build(&[project("/src/a.csproj", "PackageReference", "net6.0")
            .with("Sources", "https:/a;/b;https:/a;https://a")]);
        let meta = &graph.get_project_spec("/src/a.csproj").unwrap().restore_metadata;
        assert_eq!(meta.sources, ["https://a", "/b"]);
    }

    #[test]
    fn test_built_graph_survives_save_and_load() {
        let a = "/src/a.csproj";
        let graph = build(&[
            restore_spec(a),
            project(a, "PackageReference", "net6.0;net472")
                .with("Sources", "https:/feed/v3/index.json;/local;https://feed/v3/index.json")
                .with("FallbackFolders", "/fallback")
                .with("ConfigFilePaths", "/b/NuGet.Config;/a/NuGet.Config")
                .with("OutputPath", "/src/obj")
                .with("CentralPackageVersionsEnabled", "true")
                .with("TreatWarningsAsErrors", "true"),
            project("/src/b.csproj", "PackageReference", "net6.0"),
            reference(a, "/src/b.csproj"),
            dependency(a, "Pinned", None, "net6.0"),
            dependency(a, "Everywhere", None, ""),
            PropertyItem::of_type("CentralVersionDependency", "Pinned")
                .with("ProjectUniqueName", a)
                .with("VersionRange", "[1.2.0, )"),
            PropertyItem::of_type("DownloadDependency", "Tool")
                .with("ProjectUniqueName", a)
                .with("VersionRange", "[2.0.0]")
                .with("TargetFrameworks", "net6.0"),
            PropertyItem::of_type("FrameworkReference", "Microsoft.AspNetCore.App")
                .with("ProjectUniqueName", a)
                .with("TargetFrameworks", "net6.0"),
        ]);

        let text = graph.to_json_string();
        let back = crate::json::read_graph(&text, PathComparer::Sensitive, crate::json::ReaderKind::Streaming)
            .unwrap();
        assert_eq!(back, graph);
        assert_eq!(back.to_json_string(), text);
    }

    #[test]
    fn test_clear_keyword() {
        let graph = build(&[project("/src/a.csproj", "PackageReference", "net6.0").with("Sources", "Clear")]);
        assert!(graph.get_project_spec("/src/a.csproj").unwrap().restore_metadata.sources.is_empty());

        let err = build_graph_spec_with(
            &[project("/src/a.csproj", "PackageReference", "net6.0")
                .with("FallbackFolders", "/a;clear")],
            &options(),
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(LogCode::NU1002));
    }

    #[test]
    fn test_project_references_by_framework() {
        let graph = build(&[
            project("/src/a.csproj", "PackageReference", "net6.0;net472"),
            project("/src/b.csproj", "PackageReference", "net6.0"),
            project("/src/c.csproj", "PackageReference", "net472"),
            reference("/src/a.csproj", "/src/b.csproj")
                .with("TargetFrameworks", "net6.0")
                .with("ExcludeAssets", "Compile")
                .with("PrivateAssets", "All"),
            reference("/src/a.csproj", "/src/b.csproj").with("TargetFrameworks", "net6.0"),
            reference("/src/a.csproj", "/src/c.csproj"),
        ]);

        let meta = &graph.get_project_spec("/src/a.csproj").unwrap().restore_metadata;
        let net6 = &meta.target_frameworks[0];
        assert_eq!(net6.project_references.len(), 2);
        assert_eq!(net6.project_references[0].exclude_assets, LibraryIncludeFlags::COMPILE);
        assert_eq!(net6.project_references[0].private_assets, LibraryIncludeFlags::all());
        let net472 = &meta.target_frameworks[1];
        assert_eq!(net472.project_references.len(), 1);
        assert_eq!(net472.project_references[0].project_unique_name, "/src/c.csproj");

        assert_eq!(names(graph.get_closure("/src/a.csproj")), ["/src/a.csproj", "/src/b.csproj", "/src/c.csproj"]);
        assert_eq!(graph.get_parents("/src/b.csproj"), ["/src/a.csproj"]);
    }

    #[test]
    fn test_dangling_references_are_pruned() {
        let graph = build(&[
            project("/src/a.csproj", "PackageReference", "net6.0"),
            reference("/src/a.csproj", "/src/missing.csproj"),
            reference("/src/a.csproj", "/src/legacy.vcxproj"),
            // A project without a projectSpec item never enters the graph.
            PropertyItem::of_type("Dependency", "x").with("ProjectUniqueName", "/src/legacy.vcxproj"),
        ]);
        let spec = graph.get_project_spec("/src/a.csproj").unwrap();
        assert_eq!(spec.restore_metadata.project_references().count(), 0);
        assert_eq!(names(graph.get_closure("/src/a.csproj")), ["/src/a.csproj"]);
    }

    #[test]
    fn test_reference_casing_is_normalized_when_insensitive() {
        let items = [
            project("C:/src/A/A.csproj", "PackageReference", "net6.0"),
            project("C:/src/B/B.csproj", "PackageReference", "net6.0"),
            reference("C:/src/A/A.csproj", "c:/SRC/b/b.csproj"),
            restore_spec("c:/src/a/a.csproj"),
        ];
        let options = BuildOptions::default().with_comparer(PathComparer::Insensitive);
        let graph = build_graph_spec_with(&items, &options).unwrap();

        let spec = graph.get_project_spec("c:/src/a/a.csproj").unwrap();
        let reference = spec.restore_metadata.project_references().next().unwrap();
        assert_eq!(reference.project_unique_name, "C:/src/B/B.csproj");
        assert_eq!(reference.project_path, "C:/src/B/B.csproj");
        assert!(graph.is_restore_root("C:/src/A/A.csproj"));

        // A case sensitive build treats the reference as a different project.
        let graph = build_graph_spec_with(&items, &self::options()).unwrap();
        assert_eq!(
            graph
                .get_project_spec("C:/src/A/A.csproj")
                .unwrap()
                .restore_metadata
                .project_references()
                .count(),
            0
        );
    }

    #[test]
    fn test_tool_closure_is_independent() {
        let graph = build(&[
            restore_spec("/src/a.csproj"),
            restore_spec("tool-a-1.0.0"),
            project("/src/a.csproj", "PackageReference", "net6.0"),
            PropertyItem::of_type("projectSpec", "tool")
                .with("ProjectUniqueName", "tool-a-1.0.0")
                .with("ProjectStyle", "DotnetCliTool")
                .with("DotnetCliToolTargetFramework", "netcoreapp1.0")
                .with("ProjectPath", "/src/a.csproj"),
            dependency("tool-a-1.0.0", "a-tool", Some("[1.0.0]"), ""),
        ]);

        assert_eq!(graph.restore().count(), 2);
        assert_eq!(names(graph.get_closure("tool-a-1.0.0")), ["tool-a-1.0.0"]);
        assert_eq!(names(graph.get_closure("/src/a.csproj")), ["/src/a.csproj"]);

        let tool = graph.get_project_spec("tool-a-1.0.0").unwrap();
        assert_eq!(tool.target_frameworks[0].framework_name.short_folder_name(), "netcoreapp1.0");
        assert_eq!(tool.dependencies[0].name(), "a-tool");
        // Tools have no package version of their own.
        assert_eq!(tool.version, NuGetVersion::default());
    }

    #[test]
    fn test_packages_config_repository_path() {
        let config = |solution_dir: &str| {
            PropertyItem::of_type("projectSpec", "p")
                .with("ProjectUniqueName", "/src/p.csproj")
                .with("ProjectPath", "/src/p.csproj")
                .with("ProjectStyle", "PackagesConfig")
                .with("PackagesConfigPath", "/src/packages.config")
                .with("SolutionDir", solution_dir)
        };

        let graph = build(&[config("/sln")]);
        let meta = &graph.get_project_spec("/src/p.csproj").unwrap().restore_metadata;
        assert_eq!(meta.packages_config_path.as_deref(), Some("/src/packages.config"));
        assert_eq!(
            meta.repository_path.as_deref(),
            Some(Path::new("/sln").join("packages").display().to_string().as_str())
        );

        let graph = build(&[config("*Undefined*")]);
        assert!(graph.get_project_spec("/src/p.csproj").unwrap().restore_metadata.repository_path.is_none());

        let graph = build(&[config("/sln").with("RepositoryPath", "/repo")]);
        assert_eq!(
            graph.get_project_spec("/src/p.csproj").unwrap().restore_metadata.repository_path.as_deref(),
            Some("/repo")
        );
    }

    #[test]
    fn test_project_json_project() {
        let tmp = TempDir::new().unwrap();
        let json_path = tmp.path().join("project.json");
        std::fs::write(
            &json_path,
            r#"{"dependencies": {"x": "1.0.0"}, "frameworks": {"net46": {}, "netstandard1.3": {}}}"#,
        )
        .unwrap();
        let json_path = json_path.display().to_string();

        let graph = build(&[
            restore_spec("/src/a.csproj"),
            project("/src/a.csproj", "ProjectJson", "").with("ProjectJsonPath", &json_path),
        ]);

        let spec = graph.get_project_spec("/src/a.csproj").unwrap();
        let meta = &spec.restore_metadata;
        assert_eq!(spec.name, "a");
        assert_eq!(spec.file_path, json_path);
        assert_eq!(meta.project_style, ProjectStyle::ProjectJson);
        assert_eq!(meta.project_json_path.as_deref(), Some(json_path.as_str()));
        assert!(meta.validate_runtime_assets);
        assert_eq!(spec.dependencies[0].name(), "x");
        assert_eq!(meta.target_frameworks.len(), 2);
        assert!(graph.is_restore_root("/src/a.csproj"));
    }

    #[test]
    fn test_missing_project_json_is_an_error() {
        let err = build_graph_spec_with(
            &[project("/src/a.csproj", "ProjectJson", "").with("ProjectJsonPath", "/does/not/exist.json")],
            &options(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::ProjectJson { .. }));
    }

    #[test]
    fn test_restore_root_without_project_is_skipped() {
        let graph = build(&[restore_spec("/src/ghost.csproj")]);
        assert!(graph.is_empty());
        assert_eq!(graph.restore().count(), 0);
    }
}
