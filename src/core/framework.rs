//! Target framework monikers.
//!
//! Frameworks are written in their short folder form (`net472`,
//! `netstandard2.0`, `net6.0-windows10.0.19041`) and can also be given in
//! the long form used by build tools (`.NETFramework,Version=v4.7.2`).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Identifier used for monikers that could not be understood.
pub const UNSUPPORTED: &str = "Unsupported";

static SHORT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<id>[a-z]+(?:\.[a-z]+)*?)(?P<version>[0-9][0-9.]*)?(?:-(?P<rest>.+))?$")
        .expect("valid framework regex")
});

static PLATFORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<platform>[a-z]+)(?P<version>[0-9][0-9.]*)?$").expect("valid platform regex")
});

/// Known short identifiers, their long identifiers, and whether their
/// versions are written with dots.
const IDENTIFIERS: &[(&str, &str, bool)] = &[
    ("netcoreapp", ".NETCoreApp", true),
    ("netstandard", ".NETStandard", true),
    ("net", ".NETFramework", false),
    ("uap", "UAP", true),
    ("win", "Windows", false),
    ("wp", "WindowsPhone", false),
    ("wpa", "WindowsPhoneApp", false),
    ("monoandroid", "MonoAndroid", false),
    ("monotouch", "MonoTouch", false),
    ("monomac", "MonoMac", false),
    ("xamarinios", "Xamarin.iOS", false),
    ("xamarinmac", "Xamarin.Mac", false),
    ("tizen", "Tizen", false),
    ("dnxcore", "DNXCore", false),
    ("portable", ".NETPortable", false),
    ("native", "native", false),
];

/// Identifiers whose short names drop a trailing `.0` (`win8`, not `win80`).
const SINGLE_DIGIT: &[&str] = &["Windows", "WindowsPhone", "WindowsPhoneApp"];

const NET_CORE_APP: &str = ".NETCoreApp";
const NET_FRAMEWORK: &str = ".NETFramework";

/// Error for framework monikers that cannot be parsed at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid framework moniker '{0}'")]
pub struct FrameworkError(pub String);

/// A parsed target framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NuGetFramework {
    identifier: String,
    version: [u32; 4],
    profile: String,
    platform: String,
    platform_version: [u32; 4],
}

impl NuGetFramework {
    /// Create a framework from a long identifier and version.
    pub fn new(identifier: impl Into<String>, version: [u32; 4]) -> Self {
        NuGetFramework {
            identifier: identifier.into(),
            version,
            profile: String::new(),
            platform: String::new(),
            platform_version: [0; 4],
        }
    }

    /// The framework used for monikers nothing recognizes.
    pub fn unsupported() -> Self {
        NuGetFramework::new(UNSUPPORTED, [0; 4])
    }

    /// Parse a short folder name or a long framework name.
    ///
    /// Unknown identifiers produce [`NuGetFramework::unsupported`] rather than
    /// an error; only blank input fails.
    pub fn parse(input: &str) -> Result<Self, FrameworkError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(FrameworkError(input.to_string()));
        }
        if s.contains(',') {
            return Ok(parse_long_name(s).unwrap_or_else(NuGetFramework::unsupported));
        }
        Ok(parse_short_name(&s.to_ascii_lowercase()).unwrap_or_else(NuGetFramework::unsupported))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn version(&self) -> [u32; 4] {
        self.version
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn is_unsupported(&self) -> bool {
        self.identifier == UNSUPPORTED
    }

    /// The short folder name, e.g. `net472` or `net6.0-windows`.
    pub fn short_folder_name(&self) -> String {
        if self.is_unsupported() {
            return "unsupported".to_string();
        }

        let is_net5_plus = self.identifier == NET_CORE_APP && self.version[0] >= 5;
        let (short, dotted) = if is_net5_plus {
            ("net", true)
        } else {
            IDENTIFIERS
                .iter()
                .find(|(_, long, _)| *long == self.identifier)
                .map(|(short, _, dotted)| (*short, *dotted))
                .unwrap_or((self.identifier.as_str(), true))
        };

        let mut out = short.to_ascii_lowercase();
        if self.identifier == ".NETPortable" {
            out.push('-');
            out.push_str(&self.profile);
            return out;
        }
        if self.version != [0; 4] || dotted {
            let min_parts = if SINGLE_DIGIT.contains(&self.identifier.as_str()) {
                1
            } else {
                2
            };
            out.push_str(&format_version(self.version, dotted, min_parts));
        }
        if !self.platform.is_empty() {
            out.push('-');
            out.push_str(&self.platform);
            if self.platform_version != [0; 4] {
                out.push_str(&format_version(self.platform_version, true, 2));
            }
        } else if !self.profile.is_empty() {
            out.push('-');
            out.push_str(&self.profile);
        }
        out
    }

    /// The long name, e.g. `.NETFramework,Version=v4.7.2`.
    pub fn dotnet_framework_name(&self) -> String {
        let mut out = format!(
            "{},Version=v{}",
            self.identifier,
            format_version(self.version, true, 2)
        );
        if !self.profile.is_empty() {
            out.push_str(",Profile=");
            out.push_str(&self.profile);
        }
        out
    }
}

impl FromStr for NuGetFramework {
    type Err = FrameworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NuGetFramework::parse(s)
    }
}

impl fmt::Display for NuGetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_folder_name())
    }
}

fn parse_short_name(s: &str) -> Option<NuGetFramework> {
    let caps = SHORT_NAME.captures(s)?;
    let short_id = caps.name("id")?.as_str();
    let version = match caps.name("version") {
        Some(v) => parse_version(v.as_str())?,
        None => [0; 4],
    };
    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();

    if short_id == "portable" {
        let mut framework = NuGetFramework::new(".NETPortable", [0; 4]);
        framework.profile = rest.to_string();
        return Some(framework);
    }

    let (_, long, _) = IDENTIFIERS.iter().find(|(short, _, _)| *short == short_id)?;
    let identifier = if *long == NET_FRAMEWORK && version[0] >= 5 {
        NET_CORE_APP
    } else {
        long
    };

    let mut framework = NuGetFramework::new(identifier, version);
    if rest.is_empty() {
        return Some(framework);
    }

    if identifier == NET_CORE_APP && version[0] >= 5 {
        let caps = PLATFORM.captures(rest)?;
        framework.platform = caps.name("platform")?.as_str().to_string();
        if let Some(v) = caps.name("version") {
            let v = v.as_str();
            framework.platform_version = if v.contains('.') {
                parse_version(v)?
            } else {
                [v.parse().ok()?, 0, 0, 0]
            };
        }
    } else {
        framework.profile = rest.to_string();
    }
    Some(framework)
}

fn parse_long_name(s: &str) -> Option<NuGetFramework> {
    let mut parts = s.split(',').map(str::trim);
    let identifier = parts.next().filter(|id| !id.is_empty())?;
    let mut framework = NuGetFramework::new(identifier, [0; 4]);

    for part in parts {
        let (key, value) = part.split_once('=')?;
        match key.trim().to_ascii_lowercase().as_str() {
            "version" => {
                let value = value.trim();
                let value = value.strip_prefix(['v', 'V']).unwrap_or(value);
                framework.version = parse_version(value)?;
            }
            "profile" => framework.profile = value.trim().to_ascii_lowercase(),
            _ => return None,
        }
    }

    // Long names use canonical identifiers; fix the casing of known ones.
    if let Some((_, long, _)) = IDENTIFIERS
        .iter()
        .find(|(_, long, _)| long.eq_ignore_ascii_case(&framework.identifier))
    {
        framework.identifier = long.to_string();
    }
    Some(framework)
}

/// Parse `4.7.2` (dotted) or `472` (one digit per part).
fn parse_version(s: &str) -> Option<[u32; 4]> {
    let mut version = [0u32; 4];
    if s.contains('.') {
        for (i, piece) in s.split('.').enumerate() {
            if i >= 4 || piece.is_empty() {
                return None;
            }
            version[i] = piece.parse().ok()?;
        }
    } else {
        if s.len() > 4 {
            return None;
        }
        for (i, digit) in s.chars().enumerate() {
            version[i] = digit.to_digit(10)?;
        }
    }
    Some(version)
}

fn format_version(version: [u32; 4], dotted: bool, min_parts: usize) -> String {
    let mut len = 4;
    while len > min_parts && version[len - 1] == 0 {
        len -= 1;
    }
    let parts = &version[..len];
    if !dotted && parts.iter().all(|p| *p < 10) {
        parts.iter().map(|p| p.to_string()).collect()
    } else {
        parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}
