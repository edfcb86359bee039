//! Document schema for reading package specs.
//!
//! Every field is optional and `null` is the same as absent. All value
//! syntax is checked during deserialization, so turning a document into the
//! model afterwards cannot fail.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::dependency::{
    CentralPackageVersion, DownloadDependency, FrameworkDependency, LibraryDependency,
    LibraryRange,
};
use crate::core::flags::{FrameworkDependencyFlags, LibraryDependencyTarget, LibraryIncludeFlags};
use crate::core::framework::NuGetFramework;
use crate::core::log_code::LogCode;
use crate::core::package_spec::{
    BuildOptions, PackOptions, PackageSpec, RestoreSettings, TargetFrameworkInformation,
};
use crate::core::restore_metadata::{
    ProjectRestoreMetadata, ProjectRestoreMetadataFrameworkInfo, ProjectRestoreReference,
    ProjectStyle, RestoreLockProperties, WarningProperties,
};
use crate::core::runtime::{
    CompatibilityProfile, FrameworkRuntimePair, RuntimeDescription, RuntimeGraph,
};
use crate::core::version::{NuGetVersion, VersionRange};
use crate::json::wire::{
    FrameworkFlags, IncludeFlags, KeySet, OneOrMany, Parsed, StringOrObject, TargetFlags,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PackageSpecDoc {
    name: Option<String>,
    file_path: Option<String>,
    version: Option<Parsed<NuGetVersion>>,
    title: Option<String>,
    description: Option<String>,
    authors: Option<OneOrMany<String>>,
    owners: Option<OneOrMany<String>>,
    tags: Option<OneOrMany<String>>,
    copyright: Option<String>,
    language: Option<String>,
    release_notes: Option<String>,
    require_license_acceptance: Option<bool>,
    pack_options: Option<PackOptionsDoc>,
    scripts: Option<IndexMap<String, OneOrMany<String>>>,
    build_options: Option<BuildOptionsDoc>,
    restore_settings: Option<RestoreSettingsDoc>,
    dependencies: Option<IndexMap<String, DependencyDoc>>,
    frameworks: Option<IndexMap<Parsed<NuGetFramework>, FrameworkDoc>>,
    restore: Option<RestoreMetadataDoc>,
    runtimes: Option<IndexMap<String, RuntimeDoc>>,
    supports: Option<IndexMap<String, IndexMap<Parsed<NuGetFramework>, OneOrMany<String>>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackOptionsDoc {
    package_type: Option<OneOrMany<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildOptionsDoc {
    output_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoreSettingsDoc {
    hide_warnings_and_errors: Option<bool>,
}

type DependencyDoc = StringOrObject<Parsed<VersionRange>, DependencyObjectDoc>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DependencyObjectDoc {
    version: Option<Parsed<VersionRange>>,
    include: Option<IncludeFlags>,
    exclude: Option<IncludeFlags>,
    suppress_parent: Option<IncludeFlags>,
    target: Option<TargetFlags>,
    auto_referenced: Option<bool>,
    generate_path_property: Option<bool>,
    version_centrally_managed: Option<bool>,
    no_warn: Option<OneOrMany<String>>,
    aliases: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameworkDoc {
    target_alias: Option<String>,
    imports: Option<OneOrMany<Parsed<NuGetFramework>>>,
    asset_target_fallback: Option<bool>,
    warn: Option<bool>,
    dependencies: Option<IndexMap<String, DependencyDoc>>,
    central_package_versions: Option<IndexMap<String, Parsed<VersionRange>>>,
    download_dependencies: Option<Vec<DownloadDependencyDoc>>,
    framework_references: Option<IndexMap<String, FrameworkReferenceDoc>>,
    runtime_identifier_graph_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadDependencyDoc {
    name: String,
    version: Parsed<VersionRange>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameworkReferenceDoc {
    private_assets: Option<FrameworkFlags>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoreMetadataDoc {
    project_unique_name: Option<String>,
    project_name: Option<String>,
    project_path: Option<String>,
    project_json_path: Option<String>,
    packages_path: Option<String>,
    output_path: Option<String>,
    project_style: Option<String>,
    cross_targeting: Option<bool>,
    config_file_paths: Option<Vec<String>>,
    fallback_folders: Option<Vec<String>>,
    original_target_frameworks: Option<Vec<String>>,
    sources: Option<KeySet>,
    frameworks: Option<IndexMap<Parsed<NuGetFramework>, RestoreFrameworkDoc>>,
    legacy_packages_directory: Option<bool>,
    validate_runtime_assets: Option<bool>,
    skip_content_file_write: Option<bool>,
    warning_properties: Option<WarningPropertiesDoc>,
    restore_lock_properties: Option<RestoreLockPropertiesDoc>,
    #[serde(rename = "centralPackageVersionsManagementEnabled")]
    central_package_versions_enabled: Option<bool>,
    packages_config_path: Option<String>,
    repository_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoreFrameworkDoc {
    target_alias: Option<String>,
    project_references: Option<IndexMap<String, ProjectReferenceDoc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectReferenceDoc {
    project_path: Option<String>,
    include_assets: Option<IncludeFlags>,
    exclude_assets: Option<IncludeFlags>,
    private_assets: Option<IncludeFlags>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WarningPropertiesDoc {
    all_warnings_as_errors: Option<bool>,
    no_warn: Option<Vec<String>>,
    warn_as_error: Option<Vec<String>>,
    warn_not_as_error: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoreLockPropertiesDoc {
    restore_packages_with_lock_file: Option<String>,
    #[serde(rename = "nuGetLockFilePath")]
    nuget_lock_file_path: Option<String>,
    restore_locked_mode: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RuntimeDoc {
    #[serde(rename = "#import")]
    import: Option<Vec<String>>,
}

fn strings(value: Option<OneOrMany<String>>) -> Vec<String> {
    value
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn log_codes<I: IntoIterator<Item = String>>(values: I) -> BTreeSet<LogCode> {
    values
        .into_iter()
        .filter_map(|code| match code.parse() {
            Ok(code) => Some(code),
            Err(_) => {
                tracing::debug!("ignoring unrecognized log code '{}'", code);
                None
            }
        })
        .collect()
}

impl PackageSpecDoc {
    /// Build the model. `key` is the project's key in a graph document; it
    /// fills a restore block that does not name its project.
    pub(crate) fn into_spec(self, key: Option<&str>) -> PackageSpec {
        let name = self.name;
        let file_path = self.file_path;
        let mut spec = PackageSpec {
            version: self.version.map(|v| v.0).unwrap_or_default(),
            title: self.title,
            description: self.description,
            authors: strings(self.authors),
            owners: strings(self.owners),
            tags: strings(self.tags),
            copyright: self.copyright,
            language: self.language,
            release_notes: self.release_notes,
            require_license_acceptance: self.require_license_acceptance.unwrap_or(false),
            pack_options: PackOptions {
                package_type: strings(self.pack_options.and_then(|p| p.package_type)),
            },
            scripts: self
                .scripts
                .unwrap_or_default()
                .into_iter()
                .map(|(name, commands)| (name, commands.into_vec()))
                .collect(),
            build_options: BuildOptions {
                output_name: self.build_options.and_then(|b| b.output_name),
            },
            restore_settings: RestoreSettings {
                hide_warnings_and_errors: self
                    .restore_settings
                    .and_then(|r| r.hide_warnings_and_errors)
                    .unwrap_or(false),
            },
            dependencies: dependencies(self.dependencies),
            ..PackageSpec::default()
        };

        for (framework, doc) in self.frameworks.unwrap_or_default() {
            spec.add_framework(doc.into_framework(framework.0));
        }

        if let Some(restore) = self.restore {
            spec.restore_metadata = restore.into_metadata(key);
        }

        spec.runtime_graph = runtime_graph(self.runtimes, self.supports);

        // Explicit values win, even when empty.
        spec.file_path = file_path.unwrap_or_else(|| spec.fallback_file_path());
        spec.name = name.unwrap_or_else(|| {
            let fallback = spec.fallback_name();
            match key {
                Some(key) if fallback.is_empty() => key.to_string(),
                _ => fallback,
            }
        });
        spec
    }
}

fn dependencies(docs: Option<IndexMap<String, DependencyDoc>>) -> Vec<LibraryDependency> {
    docs.unwrap_or_default()
        .into_iter()
        .map(|(name, doc)| into_dependency(name, doc))
        .collect()
}

fn into_dependency(name: String, doc: DependencyDoc) -> LibraryDependency {
    let object = match doc {
        StringOrObject::String(range) => {
            return LibraryDependency::new(LibraryRange::package(name, Some(range.0)));
        }
        StringOrObject::Object(object) => object,
    };

    let target = object
        .target
        .map(|t| t.0)
        .unwrap_or(LibraryDependencyTarget::PACKAGE);
    let range = LibraryRange::new(name, object.version.map(|v| v.0), target);

    let include = object.include.map_or(LibraryIncludeFlags::all(), |f| f.0);
    let exclude = object.exclude.map_or(LibraryIncludeFlags::empty(), |f| f.0);
    let mut dependency = LibraryDependency::new(range)
        .with_assets(include, exclude)
        .with_suppress_parent(
            object
                .suppress_parent
                .map_or(LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT, |f| f.0),
        );
    dependency.auto_referenced = object.auto_referenced.unwrap_or(false);
    dependency.generate_path_property = object.generate_path_property.unwrap_or(false);
    dependency.version_centrally_managed = object.version_centrally_managed.unwrap_or(false);
    dependency.no_warn = log_codes(object.no_warn.map(OneOrMany::into_vec).unwrap_or_default());
    dependency.aliases = object.aliases;
    dependency
}

impl FrameworkDoc {
    fn into_framework(self, framework: NuGetFramework) -> TargetFrameworkInformation {
        let mut tfi = TargetFrameworkInformation::new(framework);
        tfi.target_alias = self.target_alias.unwrap_or_default();
        tfi.imports = self
            .imports
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(|f| f.0)
            .collect();
        tfi.asset_target_fallback = self.asset_target_fallback.unwrap_or(false);
        tfi.warn = self.warn.unwrap_or(false);
        tfi.dependencies = dependencies(self.dependencies);
        for (name, range) in self.central_package_versions.unwrap_or_default() {
            tfi.add_central_version(CentralPackageVersion::new(name, range.0));
        }
        tfi.download_dependencies = self
            .download_dependencies
            .unwrap_or_default()
            .into_iter()
            .map(|d| DownloadDependency::new(d.name, d.version.0))
            .collect();
        tfi.framework_references = self
            .framework_references
            .unwrap_or_default()
            .into_iter()
            .map(|(name, doc)| {
                let private = doc
                    .private_assets
                    .map_or(FrameworkDependencyFlags::empty(), |f| f.0);
                FrameworkDependency::new(name, private)
            })
            .collect();
        tfi.runtime_identifier_graph_path = self.runtime_identifier_graph_path;
        tfi
    }
}

impl RestoreMetadataDoc {
    fn into_metadata(self, key: Option<&str>) -> ProjectRestoreMetadata {
        let project_unique_name = match (self.project_unique_name, key) {
            (Some(name), _) => name,
            (None, Some(key)) => key.to_string(),
            (None, None) => String::new(),
        };

        let target_frameworks = self
            .frameworks
            .unwrap_or_default()
            .into_iter()
            .map(|(framework, doc)| {
                let mut info = ProjectRestoreMetadataFrameworkInfo::new(framework.0);
                info.target_alias = doc.target_alias.unwrap_or_default();
                info.project_references = doc
                    .project_references
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(unique_name, r)| {
                        let mut reference =
                            ProjectRestoreReference::new(unique_name, r.project_path.unwrap_or_default());
                        if let Some(include) = r.include_assets {
                            reference.include_assets = include.0;
                        }
                        if let Some(exclude) = r.exclude_assets {
                            reference.exclude_assets = exclude.0;
                        }
                        if let Some(private) = r.private_assets {
                            reference.private_assets = private.0;
                        }
                        reference
                    })
                    .collect();
                info
            })
            .collect();

        let warnings = self.warning_properties.unwrap_or_default();
        let lock = self.restore_lock_properties.unwrap_or_default();

        ProjectRestoreMetadata {
            project_unique_name,
            project_path: self.project_path.unwrap_or_default(),
            project_name: self.project_name.unwrap_or_default(),
            project_json_path: self.project_json_path,
            project_style: self
                .project_style
                .as_deref()
                .map(ProjectStyle::parse)
                .unwrap_or_default(),
            output_path: self.output_path,
            packages_path: self.packages_path,
            sources: self.sources.unwrap_or_default().0,
            fallback_folders: self.fallback_folders.unwrap_or_default(),
            config_file_paths: self.config_file_paths.unwrap_or_default(),
            original_target_frameworks: self.original_target_frameworks.unwrap_or_default(),
            cross_targeting: self.cross_targeting.unwrap_or(false),
            legacy_packages_directory: self.legacy_packages_directory.unwrap_or(false),
            validate_runtime_assets: self.validate_runtime_assets.unwrap_or(false),
            skip_content_file_write: self.skip_content_file_write.unwrap_or(false),
            central_package_versions_enabled: self
                .central_package_versions_enabled
                .unwrap_or(false),
            project_wide_warning_properties: WarningProperties {
                all_warnings_as_errors: warnings.all_warnings_as_errors.unwrap_or(false),
                warnings_as_errors: log_codes(warnings.warn_as_error.unwrap_or_default()),
                no_warn: log_codes(warnings.no_warn.unwrap_or_default()),
                warnings_not_as_errors: log_codes(warnings.warn_not_as_error.unwrap_or_default()),
            },
            restore_lock_properties: RestoreLockProperties {
                restore_packages_with_lock_file: lock.restore_packages_with_lock_file,
                nuget_lock_file_path: lock.nuget_lock_file_path,
                restore_locked_mode: lock.restore_locked_mode.unwrap_or(false),
            },
            packages_config_path: self.packages_config_path,
            repository_path: self.repository_path,
            target_frameworks,
        }
    }
}

type SupportsDoc = IndexMap<String, IndexMap<Parsed<NuGetFramework>, OneOrMany<String>>>;

fn runtime_graph(
    runtimes: Option<IndexMap<String, RuntimeDoc>>,
    supports: Option<SupportsDoc>,
) -> RuntimeGraph {
    let mut graph = RuntimeGraph::default();
    for (rid, doc) in runtimes.unwrap_or_default() {
        let mut description = RuntimeDescription::new(rid.clone());
        description.inherited_runtimes = doc.import.unwrap_or_default();
        graph.runtimes.insert(rid, description);
    }
    for (name, pairs) in supports.unwrap_or_default() {
        let mut profile = CompatibilityProfile::new(name.clone());
        for (framework, rids) in pairs {
            for rid in strings(Some(rids)) {
                profile.restore_contexts.push(FrameworkRuntimePair {
                    framework: framework.0.clone(),
                    runtime_identifier: rid,
                });
            }
        }
        graph.supports.insert(name, profile);
    }
    graph
}
