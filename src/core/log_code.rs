//! Restore log codes (`NU1603` and friends).

use std::fmt;
use std::str::FromStr;

/// A restore warning or error code such as `NU1603`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogCode(u16);

impl LogCode {
    /// `CLEAR` used together with other values.
    pub const NU1002: LogCode = LogCode(1002);
    /// Conflicting asset fallback declarations.
    pub const NU1003: LogCode = LogCode(1003);
    /// Version declared on a centrally managed package reference.
    pub const NU1008: LogCode = LogCode(1008);
    /// Download dependency without an exact version.
    pub const NU1011: LogCode = LogCode(1011);
    /// Project skipped because its style can't be restored.
    pub const NU1503: LogCode = LogCode(1503);
    /// Dependency version not found, a higher one was resolved.
    pub const NU1603: LogCode = LogCode(1603);

    pub const fn new(number: u16) -> Self {
        LogCode(number)
    }

    pub fn number(self) -> u16 {
        self.0
    }

    /// Parse every valid code from a `;` or `,` separated list, skipping
    /// anything that isn't a code.
    pub fn parse_list(value: &str) -> Vec<LogCode> {
        value
            .split([';', ','])
            .filter_map(|code| code.trim().parse().ok())
            .collect()
    }
}

impl FromStr for LogCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .get(..2)
            .filter(|prefix| prefix.eq_ignore_ascii_case("NU"))
            .map(|_| &s[2..])
            .ok_or_else(|| format!("'{s}' is not a log code"))?;
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("'{s}' is not a log code"));
        }
        digits
            .parse()
            .map(LogCode)
            .map_err(|_| format!("'{s}' is not a log code"))
    }
}

impl fmt::Display for LogCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NU{:04}", self.0)
    }
}
