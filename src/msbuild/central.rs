//! Central package version management.
//!
//! Under central management a project pins each package version once, with
//! `CentralVersionDependency` items, instead of on every package reference.
//! Pins without a framework list apply to the whole project; pins with one
//! apply to those frameworks only.

use indexmap::IndexMap;

use crate::core::dependency::{CentralPackageVersion, LibraryDependency};
use crate::core::version::VersionRange;

/// Central pins keyed by package id, ignoring case. The first pin for an id
/// wins.
#[derive(Debug, Clone, Default)]
pub struct CentralVersions {
    pins: IndexMap<String, CentralPackageVersion>,
}

impl CentralVersions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pin: CentralPackageVersion) {
        self.pins.entry(pin.name.to_lowercase()).or_insert(pin);
    }

    /// Add every pin of `other` that has no entry here yet.
    pub fn extend_from(&mut self, other: &CentralVersions) {
        for pin in other.iter() {
            self.insert(pin.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&CentralPackageVersion> {
        self.pins.get(&name.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CentralPackageVersion> {
        self.pins.values()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl FromIterator<CentralPackageVersion> for CentralVersions {
    fn from_iter<I: IntoIterator<Item = CentralPackageVersion>>(iter: I) -> Self {
        let mut versions = CentralVersions::new();
        for pin in iter {
            versions.insert(pin);
        }
        versions
    }
}

/// Names of explicit references that declare their own version. Under
/// central management these are an error.
pub fn find_violations<'a>(
    dependencies: impl IntoIterator<Item = &'a LibraryDependency>,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for dependency in dependencies {
        if dependency.auto_referenced || dependency.version_range().is_none() {
            continue;
        }
        if !names.iter().any(|n| n.eq_ignore_ascii_case(dependency.name())) {
            names.push(dependency.name().to_string());
        }
    }
    names
}

/// Pin unversioned explicit references.
///
/// A pinned reference takes the pin's range. A reference with no pin
/// matches every version. Either way it is marked centrally managed.
/// Implicit references are never touched.
pub fn pin_dependencies(dependencies: &mut [LibraryDependency], central: &CentralVersions) {
    for dependency in dependencies.iter_mut() {
        if dependency.auto_referenced || dependency.version_range().is_some() {
            continue;
        }
        let range = central
            .get(dependency.name())
            .map(|pin| pin.version_range.clone())
            .unwrap_or_else(VersionRange::all);
        dependency.library_range.version_range = Some(range);
        dependency.version_centrally_managed = true;
    }
}
