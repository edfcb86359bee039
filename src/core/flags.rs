//! Bitmask flags attached to dependencies and project references.
//!
//! All flag parsing is permissive: names are matched case-insensitively,
//! `,` and `;` both separate entries, and unknown names are ignored.

use bitflags::bitflags;

bitflags! {
    /// Which assets of a dependency flow to the consumer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct LibraryIncludeFlags: u16 {
        const RUNTIME = 1;
        const COMPILE = 1 << 1;
        const BUILD = 1 << 2;
        const NATIVE = 1 << 3;
        const CONTENT_FILES = 1 << 4;
        const ANALYZERS = 1 << 5;
        const BUILD_TRANSITIVE = 1 << 6;
        const BUILD_MULTITARGETING = 1 << 7;
    }
}

bitflags! {
    /// What kind of library a dependency may resolve to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct LibraryDependencyTarget: u8 {
        const PACKAGE = 1;
        const PROJECT = 1 << 1;
        const EXTERNAL_PROJECT = 1 << 2;
        const ASSEMBLY = 1 << 3;
        const REFERENCE = 1 << 4;
        const WIN_MD = 1 << 5;
    }
}

bitflags! {
    /// Whether a framework reference is private to the project.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct FrameworkDependencyFlags: u8 {
        const ALL = 1;
    }
}

const INCLUDE_NAMES: &[(&str, LibraryIncludeFlags)] = &[
    ("Runtime", LibraryIncludeFlags::RUNTIME),
    ("Compile", LibraryIncludeFlags::COMPILE),
    ("Build", LibraryIncludeFlags::BUILD),
    ("Native", LibraryIncludeFlags::NATIVE),
    ("ContentFiles", LibraryIncludeFlags::CONTENT_FILES),
    ("Analyzers", LibraryIncludeFlags::ANALYZERS),
    ("BuildTransitive", LibraryIncludeFlags::BUILD_TRANSITIVE),
    ("BuildMultitargeting", LibraryIncludeFlags::BUILD_MULTITARGETING),
];

const TARGET_NAMES: &[(&str, LibraryDependencyTarget)] = &[
    ("Package", LibraryDependencyTarget::PACKAGE),
    ("Project", LibraryDependencyTarget::PROJECT),
    ("ExternalProject", LibraryDependencyTarget::EXTERNAL_PROJECT),
    ("Assembly", LibraryDependencyTarget::ASSEMBLY),
    ("Reference", LibraryDependencyTarget::REFERENCE),
    ("WinMD", LibraryDependencyTarget::WIN_MD),
];

fn entries(value: &str) -> impl Iterator<Item = &str> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn format_names<F: bitflags::Flags + Copy>(flags: F, names: &[(&str, F)]) -> String {
    if flags.is_empty() {
        return "None".to_string();
    }
    if flags.contains(F::all()) {
        return "All".to_string();
    }
    names
        .iter()
        .filter(|(_, flag)| flags.contains(*flag))
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_names<F: bitflags::Flags + Copy>(value: &str, names: &[(&str, F)]) -> F {
    let mut flags = F::empty();
    for entry in entries(value) {
        if entry.eq_ignore_ascii_case("all") {
            flags = F::all();
        } else if let Some((_, flag)) = names.iter().find(|(n, _)| n.eq_ignore_ascii_case(entry)) {
            flags.insert(*flag);
        }
    }
    flags
}

impl LibraryIncludeFlags {
    /// Assets suppressed for consumers unless stated otherwise.
    pub const DEFAULT_SUPPRESS_PARENT: LibraryIncludeFlags = LibraryIncludeFlags::BUILD
        .union(LibraryIncludeFlags::CONTENT_FILES)
        .union(LibraryIncludeFlags::ANALYZERS);

    /// Parse a delimited flag list such as `runtime;compile` or `All`.
    pub fn parse(value: &str) -> Self {
        parse_names(value, INCLUDE_NAMES)
    }

    /// Parse an optional property, falling back when it is absent.
    pub fn parse_or(value: Option<&str>, default: Self) -> Self {
        value.map_or(default, Self::parse)
    }

    /// Render as `None`, `All`, or a `, `-separated list.
    pub fn to_flag_string(self) -> String {
        format_names(self, INCLUDE_NAMES)
    }
}

impl LibraryDependencyTarget {
    /// Packages, projects and external projects.
    pub const PACKAGE_PROJECT_EXTERNAL: LibraryDependencyTarget = LibraryDependencyTarget::PACKAGE
        .union(LibraryDependencyTarget::PROJECT)
        .union(LibraryDependencyTarget::EXTERNAL_PROJECT);

    pub fn parse(value: &str) -> Self {
        parse_names(value, TARGET_NAMES)
    }

    pub fn to_flag_string(self) -> String {
        format_names(self, TARGET_NAMES)
    }
}

impl FrameworkDependencyFlags {
    /// `all` makes the reference private; anything else means `none`.
    pub fn parse(value: &str) -> Self {
        if entries(value).any(|e| e.eq_ignore_ascii_case("all")) {
            FrameworkDependencyFlags::ALL
        } else {
            FrameworkDependencyFlags::empty()
        }
    }

    pub fn to_flag_string(self) -> &'static str {
        if self.contains(FrameworkDependencyFlags::ALL) {
            "all"
        } else {
            "none"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_flags_parse() {
        let flags = LibraryIncludeFlags::parse("runtime; Compile,build");
        assert_eq!(
            flags,
            LibraryIncludeFlags::RUNTIME | LibraryIncludeFlags::COMPILE | LibraryIncludeFlags::BUILD
        );
        assert_eq!(LibraryIncludeFlags::parse("All"), LibraryIncludeFlags::all());
        assert_eq!(LibraryIncludeFlags::parse("none"), LibraryIncludeFlags::empty());
        assert_eq!(LibraryIncludeFlags::parse("bogus"), LibraryIncludeFlags::empty());
    }

    #[test]
    fn test_include_flags_format() {
        assert_eq!(LibraryIncludeFlags::all().to_flag_string(), "All");
        assert_eq!(LibraryIncludeFlags::empty().to_flag_string(), "None");
        assert_eq!(
            LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT.to_flag_string(),
            "Build, ContentFiles, Analyzers"
        );
        let text = (LibraryIncludeFlags::RUNTIME | LibraryIncludeFlags::NATIVE).to_flag_string();
        assert_eq!(
            LibraryIncludeFlags::parse(&text),
            LibraryIncludeFlags::RUNTIME | LibraryIncludeFlags::NATIVE
        );
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(
            LibraryIncludeFlags::parse_or(None, LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT),
            LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT
        );
    }

    #[test]
    fn test_target_flags() {
        assert_eq!(
            LibraryDependencyTarget::parse("Package,Project,ExternalProject"),
            LibraryDependencyTarget::PACKAGE_PROJECT_EXTERNAL
        );
        assert_eq!(LibraryDependencyTarget::PACKAGE.to_flag_string(), "Package");
        assert_eq!(LibraryDependencyTarget::all().to_flag_string(), "All");
    }

    #[test]
    fn test_framework_flags() {
        assert_eq!(FrameworkDependencyFlags::parse("All"), FrameworkDependencyFlags::ALL);
        assert_eq!(FrameworkDependencyFlags::parse("none").to_flag_string(), "none");
    }
}
