//! Writes package specs and graphs as JSON values.
//!
//! Output is deterministic: properties are written in a fixed order, keyed
//! collections follow the model's order, and defaults are left out so that
//! reading a written document gives back the same model.

use serde_json::{json, Map, Value};

use crate::core::dependency::LibraryDependency;
use crate::core::flags::LibraryIncludeFlags;
use crate::core::graph_spec::DependencyGraphSpec;
use crate::core::log_code::LogCode;
use crate::core::package_spec::{PackageSpec, TargetFrameworkInformation};
use crate::core::restore_metadata::{ProjectRestoreMetadata, ProjectStyle, WarningProperties};
use crate::core::runtime::RuntimeGraph;

/// The document format number written at the top of graph documents.
pub const FORMAT_VERSION: u64 = 1;

/// Small builder over a JSON object that skips empty values.
#[derive(Default)]
struct Object(Map<String, Value>);

impl Object {
    fn put(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    fn put_str(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.put(key, value);
        }
        self
    }

    fn put_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.put(key, value);
        }
        self
    }

    fn put_true(&mut self, key: &str, value: bool) -> &mut Self {
        if value {
            self.put(key, true);
        }
        self
    }

    fn put_list<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        if !values.is_empty() {
            let list: Vec<Value> = values.iter().map(|v| Value::from(v.as_ref())).collect();
            self.put(key, list);
        }
        self
    }

    fn put_object(&mut self, key: &str, object: Object) -> &mut Self {
        if !object.0.is_empty() {
            self.put(key, Value::Object(object.0));
        }
        self
    }

    fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn codes<'a>(codes: impl IntoIterator<Item = &'a LogCode>) -> Vec<String> {
    codes.into_iter().map(LogCode::to_string).collect()
}

/// Write a graph document.
pub fn graph_to_value(graph: &DependencyGraphSpec) -> Value {
    let mut out = Object::default();
    out.put("format", FORMAT_VERSION);

    let mut restore = Map::new();
    for name in graph.restore() {
        restore.insert(name.to_string(), json!({}));
    }
    out.put("restore", Value::Object(restore));

    let mut projects = Map::new();
    for spec in graph.projects() {
        projects.insert(spec.unique_name().to_string(), package_spec_to_value(spec));
    }
    out.put("projects", Value::Object(projects));

    for (key, value) in graph.extensions() {
        if !out.0.contains_key(key) {
            out.put(key, value.clone());
        }
    }
    out.into_value()
}

/// Write one project's spec.
pub fn package_spec_to_value(spec: &PackageSpec) -> Value {
    let mut out = Object::default();

    if spec.name != spec.fallback_name() {
        out.put("name", spec.name.as_str());
    }
    if spec.file_path != spec.fallback_file_path() {
        out.put("filePath", spec.file_path.as_str());
    }
    out.put("version", spec.version.to_string());
    out.put_opt("title", spec.title.as_deref())
        .put_opt("description", spec.description.as_deref())
        .put_opt("copyright", spec.copyright.as_deref())
        .put_list("authors", &spec.authors)
        .put_list("owners", &spec.owners)
        .put_list("tags", &spec.tags)
        .put_opt("language", spec.language.as_deref())
        .put_opt("releaseNotes", spec.release_notes.as_deref())
        .put_true("requireLicenseAcceptance", spec.require_license_acceptance);

    if !spec.restore_metadata.is_default() {
        out.put("restore", restore_metadata_to_value(&spec.restore_metadata));
    }

    let mut restore_settings = Object::default();
    restore_settings.put_true(
        "hideWarningsAndErrors",
        spec.restore_settings.hide_warnings_and_errors,
    );
    out.put_object("restoreSettings", restore_settings);

    let mut pack_options = Object::default();
    pack_options.put_list("packageType", &spec.pack_options.package_type);
    out.put_object("packOptions", pack_options);

    let mut build_options = Object::default();
    build_options.put_opt("outputName", spec.build_options.output_name.as_deref());
    out.put_object("buildOptions", build_options);

    let mut scripts = Object::default();
    for (name, commands) in &spec.scripts {
        scripts.put(name, commands.clone());
    }
    out.put_object("scripts", scripts);

    out.put_object("dependencies", dependencies_to_object(&spec.dependencies));

    let mut frameworks = Object::default();
    for tfi in &spec.target_frameworks {
        frameworks.put(&tfi.framework_name.short_folder_name(), framework_to_value(tfi));
    }
    out.put_object("frameworks", frameworks);

    write_runtime_graph(&mut out, &spec.runtime_graph);
    out.into_value()
}

fn dependencies_to_object(dependencies: &[LibraryDependency]) -> Object {
    let mut out = Object::default();
    for dependency in dependencies {
        out.put(dependency.name(), dependency_to_value(dependency));
    }
    out
}

fn dependency_to_value(dependency: &LibraryDependency) -> Value {
    let mut out = Object::default();
    if dependency.include_type != LibraryIncludeFlags::all() {
        out.put("include", dependency.include_type.to_flag_string());
    }
    if dependency.suppress_parent != LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT {
        out.put("suppressParent", dependency.suppress_parent.to_flag_string());
    }
    out.put(
        "target",
        dependency.library_range.type_constraint.to_flag_string(),
    );
    if let Some(range) = dependency.version_range() {
        out.put("version", range.to_string());
    }
    out.put_true("autoReferenced", dependency.auto_referenced)
        .put_true("generatePathProperty", dependency.generate_path_property)
        .put_true("versionCentrallyManaged", dependency.version_centrally_managed)
        .put_list("noWarn", &codes(&dependency.no_warn))
        .put_opt("aliases", dependency.aliases.as_deref());
    out.into_value()
}

fn framework_to_value(tfi: &TargetFrameworkInformation) -> Value {
    let mut out = Object::default();
    out.put_str("targetAlias", &tfi.target_alias);

    let imports: Vec<String> = tfi.imports.iter().map(|f| f.short_folder_name()).collect();
    out.put_list("imports", &imports)
        .put_true("assetTargetFallback", tfi.asset_target_fallback)
        .put_true("warn", tfi.warn);

    out.put_object("dependencies", dependencies_to_object(&tfi.dependencies));

    let mut central = Object::default();
    for pin in tfi.central_package_versions.values() {
        central.put(&pin.name, pin.version_range.to_string());
    }
    out.put_object("centralPackageVersions", central);

    if !tfi.download_dependencies.is_empty() {
        let downloads: Vec<Value> = tfi
            .download_dependencies
            .iter()
            .map(|d| json!({ "name": d.name, "version": d.version_range.to_string() }))
            .collect();
        out.put("downloadDependencies", downloads);
    }

    let mut references = Object::default();
    for reference in &tfi.framework_references {
        references.put(
            &reference.name,
            json!({ "privateAssets": reference.private_assets.to_flag_string() }),
        );
    }
    out.put_object("frameworkReferences", references);

    out.put_opt(
        "runtimeIdentifierGraphPath",
        tfi.runtime_identifier_graph_path.as_deref(),
    );
    out.into_value()
}

fn restore_metadata_to_value(meta: &ProjectRestoreMetadata) -> Value {
    let mut out = Object::default();
    out.put("projectUniqueName", meta.project_unique_name.as_str());
    out.put_str("projectName", &meta.project_name)
        .put_str("projectPath", &meta.project_path)
        .put_opt("projectJsonPath", meta.project_json_path.as_deref())
        .put_opt("packagesPath", meta.packages_path.as_deref())
        .put_opt("outputPath", meta.output_path.as_deref());
    if meta.project_style != ProjectStyle::Unknown {
        out.put("projectStyle", meta.project_style.as_str());
    }
    out.put_true("crossTargeting", meta.cross_targeting)
        .put_list("configFilePaths", &meta.config_file_paths)
        .put_list("fallbackFolders", &meta.fallback_folders)
        .put_list("originalTargetFrameworks", &meta.original_target_frameworks);

    let mut sources = Object::default();
    for source in &meta.sources {
        sources.put(source, json!({}));
    }
    out.put_object("sources", sources);

    let mut frameworks = Object::default();
    for info in &meta.target_frameworks {
        let mut framework = Object::default();
        framework.put_str("targetAlias", &info.target_alias);
        let mut references = Map::new();
        for reference in &info.project_references {
            let mut value = Object::default();
            value.put("projectPath", reference.project_path.as_str());
            if reference.include_assets != LibraryIncludeFlags::all() {
                value.put("includeAssets", reference.include_assets.to_flag_string());
            }
            if !reference.exclude_assets.is_empty() {
                value.put("excludeAssets", reference.exclude_assets.to_flag_string());
            }
            if reference.private_assets != LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT {
                value.put("privateAssets", reference.private_assets.to_flag_string());
            }
            references.insert(reference.project_unique_name.clone(), value.into_value());
        }
        framework.put("projectReferences", Value::Object(references));
        frameworks.put(&info.framework.short_folder_name(), framework.into_value());
    }
    out.put_object("frameworks", frameworks);

    out.put_true("legacyPackagesDirectory", meta.legacy_packages_directory)
        .put_true("validateRuntimeAssets", meta.validate_runtime_assets)
        .put_true("skipContentFileWrite", meta.skip_content_file_write);

    out.put_object(
        "warningProperties",
        warning_properties_to_object(&meta.project_wide_warning_properties),
    );

    let lock = &meta.restore_lock_properties;
    let mut lock_out = Object::default();
    lock_out
        .put_opt(
            "restorePackagesWithLockFile",
            lock.restore_packages_with_lock_file.as_deref(),
        )
        .put_opt("nuGetLockFilePath", lock.nuget_lock_file_path.as_deref())
        .put_true("restoreLockedMode", lock.restore_locked_mode);
    out.put_object("restoreLockProperties", lock_out);

    out.put_true(
        "centralPackageVersionsManagementEnabled",
        meta.central_package_versions_enabled,
    )
    .put_opt("packagesConfigPath", meta.packages_config_path.as_deref())
    .put_opt("repositoryPath", meta.repository_path.as_deref());
    out.into_value()
}

fn warning_properties_to_object(props: &WarningProperties) -> Object {
    let mut out = Object::default();
    out.put_true("allWarningsAsErrors", props.all_warnings_as_errors)
        .put_list("noWarn", &codes(&props.no_warn))
        .put_list("warnAsError", &codes(&props.warnings_as_errors))
        .put_list("warnNotAsError", &codes(&props.warnings_not_as_errors));
    out
}

fn write_runtime_graph(out: &mut Object, graph: &RuntimeGraph) {
    let mut runtimes = Object::default();
    for (rid, description) in &graph.runtimes {
        runtimes.put(rid, json!({ "#import": description.inherited_runtimes }));
    }
    out.put_object("runtimes", runtimes);

    let mut supports = Object::default();
    for (name, profile) in &graph.supports {
        let mut pairs: Map<String, Value> = Map::new();
        for pair in &profile.restore_contexts {
            let entry = pairs
                .entry(pair.framework.short_folder_name())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(rids) = entry {
                rids.push(Value::from(pair.runtime_identifier.as_str()));
            }
        }
        supports.put(name, Value::Object(pairs));
    }
    out.put_object("supports", supports);
}
