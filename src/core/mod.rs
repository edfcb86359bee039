//! Core data structures for dgspec.
//!
//! This module contains the restore model:
//! - Versions, version ranges and target frameworks
//! - Dependencies and their asset flags
//! - Per-project restore metadata and package specs
//! - The dependency graph specification

pub mod dependency;
pub mod flags;
pub mod framework;
pub mod graph_spec;
pub mod log_code;
pub mod package_spec;
pub mod restore_metadata;
pub mod runtime;
pub mod version;

pub use dependency::{
    CentralPackageVersion, DownloadDependency, FrameworkDependency, LibraryDependency,
    LibraryRange,
};
pub use flags::{FrameworkDependencyFlags, LibraryDependencyTarget, LibraryIncludeFlags};
pub use framework::NuGetFramework;
pub use graph_spec::{DependencyGraphSpec, PathCasingTable, PathComparer};
pub use log_code::LogCode;
pub use package_spec::{PackageSpec, TargetFrameworkInformation};
pub use restore_metadata::{
    ProjectRestoreMetadata, ProjectRestoreMetadataFrameworkInfo, ProjectRestoreReference,
    ProjectStyle, RestoreLockProperties, WarningProperties,
};
pub use runtime::RuntimeGraph;
pub use version::{NuGetVersion, VersionRange};
