//! Package versions and version ranges.
//!
//! Package versions have up to four numeric parts (`1.2.3.4`) followed by an
//! optional release label and build metadata. Release labels and metadata
//! reuse the identifier rules (and precedence) of semver.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease};
use thiserror::Error;

/// Error parsing a version or a version range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("'{0}' is not a valid version string")]
    InvalidVersion(String),

    #[error("'{0}' is not a valid version range")]
    InvalidRange(String),
}

/// A package version: `major.minor.patch[.revision][-release][+metadata]`.
///
/// Release labels follow semver identifier rules, which are narrower than
/// some feeds allow: a numeric label part may not have leading zeros, so
/// `1.0.0-beta.01` is rejected. Use `beta.1` or `beta01` instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NuGetVersion {
    major: u64,
    minor: u64,
    patch: u64,
    revision: u64,
    release: Prerelease,
    metadata: BuildMetadata,
}

impl NuGetVersion {
    /// Create a stable version from three parts.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        NuGetVersion {
            major,
            minor,
            patch,
            revision: 0,
            release: Prerelease::EMPTY,
            metadata: BuildMetadata::EMPTY,
        }
    }

    /// Set the fourth numeric part.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Set the release label, e.g. `beta.1`.
    pub fn with_release(mut self, label: &str) -> Result<Self, VersionError> {
        self.release =
            Prerelease::new(label).map_err(|_| VersionError::InvalidVersion(label.to_string()))?;
        Ok(self)
    }

    /// Parse a version string. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersion(input.to_string());
        let s = input.trim();
        if s.is_empty() {
            return Err(invalid());
        }

        let (rest, metadata) = match s.split_once('+') {
            Some((_, "")) => return Err(invalid()),
            Some((rest, meta)) => (rest, BuildMetadata::new(meta).map_err(|_| invalid())?),
            None => (s, BuildMetadata::EMPTY),
        };
        let (numbers, release) = match rest.split_once('-') {
            Some((_, "")) => return Err(invalid()),
            Some((numbers, label)) => (numbers, Prerelease::new(label).map_err(|_| invalid())?),
            None => (rest, Prerelease::EMPTY),
        };

        let mut parts = [0u64; 4];
        let mut count = 0;
        for piece in numbers.split('.') {
            if count == parts.len() || piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(invalid());
            }
            parts[count] = piece.parse().map_err(|_| invalid())?;
            count += 1;
        }

        Ok(NuGetVersion {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            revision: parts[3],
            release,
            metadata,
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The release label, empty for stable versions.
    pub fn release(&self) -> &str {
        self.release.as_str()
    }

    /// The build metadata, empty when absent.
    pub fn metadata(&self) -> &str {
        self.metadata.as_str()
    }

    /// Check if this is a pre-release version.
    pub fn is_prerelease(&self) -> bool {
        !self.release.is_empty()
    }

    /// The version without build metadata.
    pub fn to_normalized_string(&self) -> String {
        let mut out = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if self.revision > 0 {
            out.push_str(&format!(".{}", self.revision));
        }
        if !self.release.is_empty() {
            out.push('-');
            out.push_str(self.release.as_str());
        }
        out
    }

    /// Compare ignoring build metadata.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.revision)
            .cmp(&(other.major, other.minor, other.patch, other.revision))
            .then_with(|| self.release.cmp(&other.release))
    }
}

impl Default for NuGetVersion {
    fn default() -> Self {
        NuGetVersion::new(1, 0, 0)
    }
}

impl FromStr for NuGetVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NuGetVersion::parse(s)
    }
}

impl fmt::Display for NuGetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_normalized_string())?;
        if !self.metadata.is_empty() {
            write!(f, "+{}", self.metadata)?;
        }
        Ok(())
    }
}

/// A range of acceptable versions, e.g. `[1.0.0, 2.0.0)`.
///
/// Unbounded ends are always exclusive, so `(, )` and an unbounded range built
/// in code compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    min: Option<NuGetVersion>,
    include_min: bool,
    max: Option<NuGetVersion>,
    include_max: bool,
}

impl VersionRange {
    /// Create a range from its bounds.
    pub fn new(
        min: Option<NuGetVersion>,
        include_min: bool,
        max: Option<NuGetVersion>,
        include_max: bool,
    ) -> Self {
        VersionRange {
            include_min: include_min && min.is_some(),
            include_max: include_max && max.is_some(),
            min,
            max,
        }
    }

    /// The range that matches every version: `(, )`.
    pub fn all() -> Self {
        VersionRange::new(None, false, None, false)
    }

    /// `[version, )`
    pub fn at_least(version: NuGetVersion) -> Self {
        VersionRange::new(Some(version), true, None, false)
    }

    /// `[version]`
    pub fn exact(version: NuGetVersion) -> Self {
        VersionRange::new(Some(version.clone()), true, Some(version), true)
    }

    /// Parse a range. A bare version means "this version or higher".
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidRange(input.to_string());
        let s = input.trim();
        if s.is_empty() {
            return Err(invalid());
        }

        let first = s.as_bytes()[0];
        if first != b'[' && first != b'(' {
            let version = NuGetVersion::parse(s).map_err(|_| invalid())?;
            return Ok(VersionRange::at_least(version));
        }

        let last = s.as_bytes()[s.len() - 1];
        if s.len() < 2 || (last != b']' && last != b')') {
            return Err(invalid());
        }
        let include_min = first == b'[';
        let include_max = last == b']';
        let inner = &s[1..s.len() - 1];

        let parse_bound = |part: &str| -> Result<Option<NuGetVersion>, VersionError> {
            let part = part.trim();
            if part.is_empty() {
                Ok(None)
            } else {
                NuGetVersion::parse(part).map(Some).map_err(|_| invalid())
            }
        };

        let pieces: Vec<&str> = inner.split(',').collect();
        let range = match pieces.as_slice() {
            [single] => {
                // `[1.0.0]` is the only single-bound form.
                if !include_min || !include_max {
                    return Err(invalid());
                }
                let version = parse_bound(single)?.ok_or_else(invalid)?;
                VersionRange::exact(version)
            }
            [lower, upper] => {
                let min = parse_bound(lower)?;
                let max = parse_bound(upper)?;
                if let (Some(min), Some(max)) = (&min, &max) {
                    match min.cmp_precedence(max) {
                        Ordering::Greater => return Err(invalid()),
                        Ordering::Equal if !(include_min && include_max) => return Err(invalid()),
                        _ => {}
                    }
                }
                VersionRange::new(min, include_min, max, include_max)
            }
            _ => return Err(invalid()),
        };

        Ok(range)
    }

    pub fn min_version(&self) -> Option<&NuGetVersion> {
        self.min.as_ref()
    }

    pub fn max_version(&self) -> Option<&NuGetVersion> {
        self.max.as_ref()
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.include_min
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.include_max
    }

    /// Check if the range has neither bound.
    pub fn is_all(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// The single version this range pins, if it is of the form `[x]`.
    pub fn exact_version(&self) -> Option<&NuGetVersion> {
        match (&self.min, &self.max) {
            (Some(min), Some(max))
                if self.include_min
                    && self.include_max
                    && min.cmp_precedence(max) == Ordering::Equal =>
            {
                Some(min)
            }
            _ => None,
        }
    }

    /// Check if a version falls within this range.
    pub fn satisfies(&self, version: &NuGetVersion) -> bool {
        let above_min = match &self.min {
            Some(min) => match version.cmp_precedence(min) {
                Ordering::Greater => true,
                Ordering::Equal => self.include_min,
                Ordering::Less => false,
            },
            None => true,
        };
        let below_max = match &self.max {
            Some(max) => match version.cmp_precedence(max) {
                Ordering::Less => true,
                Ordering::Equal => self.include_max,
                Ordering::Greater => false,
            },
            None => true,
        };
        above_min && below_max
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(exact) = self.exact_version() {
            if self.min == self.max {
                return write!(f, "[{}]", exact);
            }
        }

        let open = if self.include_min { '[' } else { '(' };
        let close = if self.include_max { ']' } else { ')' };
        write!(f, "{}", open)?;
        if let Some(min) = &self.min {
            write!(f, "{}", min)?;
        }
        f.write_str(", ")?;
        if let Some(max) = &self.max {
            write!(f, "{}", max)?;
        }
        write!(f, "{}", close)
    }
}
