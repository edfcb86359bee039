//! Dependency declarations.
//!
//! A [`LibraryDependency`] describes what a project requires from a package or
//! another project, together with the asset flags that control what flows to
//! consumers.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::flags::{FrameworkDependencyFlags, LibraryDependencyTarget, LibraryIncludeFlags};
use crate::core::log_code::LogCode;
use crate::core::version::VersionRange;

/// A library name with an optional version range and a type constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRange {
    pub name: String,
    /// `None` when no version was declared, e.g. implicit references under
    /// central version management.
    pub version_range: Option<VersionRange>,
    pub type_constraint: LibraryDependencyTarget,
}

impl LibraryRange {
    pub fn new(
        name: impl Into<String>,
        version_range: Option<VersionRange>,
        type_constraint: LibraryDependencyTarget,
    ) -> Self {
        LibraryRange {
            name: name.into(),
            version_range,
            type_constraint,
        }
    }

    /// A package reference with the given range.
    pub fn package(name: impl Into<String>, version_range: Option<VersionRange>) -> Self {
        LibraryRange::new(name, version_range, LibraryDependencyTarget::PACKAGE)
    }
}

impl fmt::Display for LibraryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(range) = &self.version_range {
            write!(f, " {}", range)?;
        }
        Ok(())
    }
}

/// A dependency of a project, either framework specific or project wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDependency {
    pub library_range: LibraryRange,
    /// Effective include flags: the include list minus the exclude list.
    pub include_type: LibraryIncludeFlags,
    pub suppress_parent: LibraryIncludeFlags,
    pub auto_referenced: bool,
    pub generate_path_property: bool,
    pub aliases: Option<String>,
    pub no_warn: BTreeSet<LogCode>,
    pub version_centrally_managed: bool,
}

impl LibraryDependency {
    /// Create a dependency with default asset flags.
    pub fn new(library_range: LibraryRange) -> Self {
        LibraryDependency {
            library_range,
            include_type: LibraryIncludeFlags::all(),
            suppress_parent: LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT,
            auto_referenced: false,
            generate_path_property: false,
            aliases: None,
            no_warn: BTreeSet::new(),
            version_centrally_managed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.library_range.name
    }

    pub fn version_range(&self) -> Option<&VersionRange> {
        self.library_range.version_range.as_ref()
    }

    /// Set include/exclude flags; the stored value is `include & !exclude`.
    pub fn with_assets(mut self, include: LibraryIncludeFlags, exclude: LibraryIncludeFlags) -> Self {
        self.include_type = include & !exclude;
        self
    }

    pub fn with_suppress_parent(mut self, suppress_parent: LibraryIncludeFlags) -> Self {
        self.suppress_parent = suppress_parent;
        self
    }

    /// Check if two dependencies refer to the same library (names compare
    /// case-insensitively).
    pub fn same_library(&self, other: &LibraryDependency) -> bool {
        self.name().eq_ignore_ascii_case(other.name())
    }
}

/// A version pinned once for a package under central version management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralPackageVersion {
    pub name: String,
    pub version_range: VersionRange,
}

impl CentralPackageVersion {
    pub fn new(name: impl Into<String>, version_range: VersionRange) -> Self {
        CentralPackageVersion {
            name: name.into(),
            version_range,
        }
    }
}

/// A package that is downloaded but not referenced. Versions are exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDependency {
    pub name: String,
    pub version_range: VersionRange,
}

impl DownloadDependency {
    pub fn new(name: impl Into<String>, version_range: VersionRange) -> Self {
        DownloadDependency {
            name: name.into(),
            version_range,
        }
    }
}

/// A shared framework reference, e.g. `Microsoft.AspNetCore.App`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkDependency {
    pub name: String,
    pub private_assets: FrameworkDependencyFlags,
}

impl FrameworkDependency {
    pub fn new(name: impl Into<String>, private_assets: FrameworkDependencyFlags) -> Self {
        FrameworkDependency {
            name: name.into(),
            private_assets,
        }
    }
}
