//! Restore metadata attached to each project.
//!
//! This is everything restore needs to know about a project beyond its
//! dependencies: identity, style, sources, folders, warning policy, and the
//! project-to-project references grouped per target framework.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::flags::LibraryIncludeFlags;
use crate::core::framework::NuGetFramework;
use crate::core::log_code::LogCode;

/// How a project declares its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectStyle {
    #[default]
    Unknown,
    ProjectJson,
    PackageReference,
    DotnetCliTool,
    Standalone,
    DotnetToolReference,
    PackagesConfig,
}

const STYLE_NAMES: &[(&str, ProjectStyle)] = &[
    ("Unknown", ProjectStyle::Unknown),
    ("ProjectJson", ProjectStyle::ProjectJson),
    ("PackageReference", ProjectStyle::PackageReference),
    ("DotnetCliTool", ProjectStyle::DotnetCliTool),
    ("Standalone", ProjectStyle::Standalone),
    ("DotnetToolReference", ProjectStyle::DotnetToolReference),
    ("PackagesConfig", ProjectStyle::PackagesConfig),
];

impl ProjectStyle {
    /// Parse a style name case-insensitively. Unrecognized or blank input is
    /// [`ProjectStyle::Unknown`], never an error.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        STYLE_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value))
            .map(|(_, style)| *style)
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        STYLE_NAMES
            .iter()
            .find(|(_, style)| *style == self)
            .map(|(name, _)| *name)
            .unwrap_or("Unknown")
    }

    /// Styles that take part in restore at all.
    pub fn is_restorable(self) -> bool {
        !matches!(self, ProjectStyle::Unknown)
    }

    /// Styles that declare package dependencies through build items.
    pub fn consumes_packages(self) -> bool {
        matches!(
            self,
            ProjectStyle::PackageReference
                | ProjectStyle::Standalone
                | ProjectStyle::DotnetCliTool
                | ProjectStyle::DotnetToolReference
        )
    }

    /// Styles that carry a package version, runtime graph and warning policy.
    pub fn has_package_semantics(self) -> bool {
        matches!(
            self,
            ProjectStyle::PackageReference
                | ProjectStyle::Standalone
                | ProjectStyle::DotnetToolReference
        )
    }
}

impl fmt::Display for ProjectStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge to another project, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRestoreReference {
    pub project_unique_name: String,
    pub project_path: String,
    pub include_assets: LibraryIncludeFlags,
    pub exclude_assets: LibraryIncludeFlags,
    pub private_assets: LibraryIncludeFlags,
}

impl ProjectRestoreReference {
    pub fn new(project_unique_name: impl Into<String>, project_path: impl Into<String>) -> Self {
        ProjectRestoreReference {
            project_unique_name: project_unique_name.into(),
            project_path: project_path.into(),
            include_assets: LibraryIncludeFlags::all(),
            exclude_assets: LibraryIncludeFlags::empty(),
            private_assets: LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT,
        }
    }
}

/// Project references that apply to one target framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRestoreMetadataFrameworkInfo {
    pub framework: NuGetFramework,
    pub target_alias: String,
    pub project_references: Vec<ProjectRestoreReference>,
}

impl ProjectRestoreMetadataFrameworkInfo {
    pub fn new(framework: NuGetFramework) -> Self {
        ProjectRestoreMetadataFrameworkInfo {
            framework,
            target_alias: String::new(),
            project_references: Vec::new(),
        }
    }
}

/// Project wide warning policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WarningProperties {
    pub all_warnings_as_errors: bool,
    pub warnings_as_errors: BTreeSet<LogCode>,
    pub no_warn: BTreeSet<LogCode>,
    pub warnings_not_as_errors: BTreeSet<LogCode>,
}

impl WarningProperties {
    /// Build from the raw property values; blank values mean "nothing set".
    pub fn from_properties(
        treat_warnings_as_errors: Option<&str>,
        warnings_as_errors: Option<&str>,
        no_warn: Option<&str>,
        warnings_not_as_errors: Option<&str>,
    ) -> Self {
        let codes = |value: Option<&str>| -> BTreeSet<LogCode> {
            value.map(LogCode::parse_list).unwrap_or_default().into_iter().collect()
        };
        WarningProperties {
            all_warnings_as_errors: treat_warnings_as_errors
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            warnings_as_errors: codes(warnings_as_errors),
            no_warn: codes(no_warn),
            warnings_not_as_errors: codes(warnings_not_as_errors),
        }
    }

    pub fn is_default(&self) -> bool {
        *self == WarningProperties::default()
    }
}

/// Lock file settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestoreLockProperties {
    pub restore_packages_with_lock_file: Option<String>,
    pub nuget_lock_file_path: Option<String>,
    pub restore_locked_mode: bool,
}

impl RestoreLockProperties {
    pub fn is_default(&self) -> bool {
        *self == RestoreLockProperties::default()
    }
}

/// Everything restore needs to know about a project.
///
/// `packages_config_path` and `repository_path` are only meaningful for
/// [`ProjectStyle::PackagesConfig`] projects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectRestoreMetadata {
    pub project_unique_name: String,
    pub project_path: String,
    pub project_name: String,
    pub project_json_path: Option<String>,
    pub project_style: ProjectStyle,
    pub output_path: Option<String>,
    pub packages_path: Option<String>,
    pub sources: Vec<String>,
    pub fallback_folders: Vec<String>,
    pub config_file_paths: Vec<String>,
    pub original_target_frameworks: Vec<String>,
    pub cross_targeting: bool,
    pub legacy_packages_directory: bool,
    pub validate_runtime_assets: bool,
    pub skip_content_file_write: bool,
    pub central_package_versions_enabled: bool,
    pub project_wide_warning_properties: WarningProperties,
    pub restore_lock_properties: RestoreLockProperties,
    pub packages_config_path: Option<String>,
    pub repository_path: Option<String>,
    pub target_frameworks: Vec<ProjectRestoreMetadataFrameworkInfo>,
}

impl ProjectRestoreMetadata {
    /// Iterate over every project reference across all frameworks.
    pub fn project_references(&self) -> impl Iterator<Item = &ProjectRestoreReference> {
        self.target_frameworks
            .iter()
            .flat_map(|f| f.project_references.iter())
    }

    pub fn framework_info(
        &self,
        framework: &NuGetFramework,
    ) -> Option<&ProjectRestoreMetadataFrameworkInfo> {
        self.target_frameworks
            .iter()
            .find(|f| &f.framework == framework)
    }

    pub fn is_default(&self) -> bool {
        *self == ProjectRestoreMetadata::default()
    }
}
