//! String conventions of build properties.

/// The keyword that discards inherited list values.
pub const CLEAR: &str = "clear";

/// Split a `;` delimited property into trimmed, non-empty entries.
pub fn split(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build properties are `True`/`False` strings; anything else is false.
pub fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

pub fn contains_clear_keyword(values: &[String]) -> bool {
    values.iter().any(|v| v.eq_ignore_ascii_case(CLEAR))
}

/// `clear` may only appear on its own.
pub fn has_invalid_clear(values: &[String]) -> bool {
    values.len() > 1 && contains_clear_keyword(values)
}

/// Drop everything up to and including the last `clear`.
pub fn handle_clear(values: Vec<String>) -> Vec<String> {
    match values.iter().rposition(|v| v.eq_ignore_ascii_case(CLEAR)) {
        Some(last) => values.into_iter().skip(last + 1).collect(),
        None => values,
    }
}

const SCHEMES: &[&str] = &["http:", "https:", "file:"];

/// Restore the `//` that evaluation strips from `scheme://` on some hosts.
///
/// Only `http:`, `https:` and `file:` followed by exactly one slash are
/// repaired, and only when the value has no `//` anywhere. `file:` gets
/// `///` off Windows to keep the empty host.
pub fn fix_source_path(value: &str) -> String {
    fix_source_path_for(value, cfg!(windows))
}

/// [`fix_source_path`] for an explicit host kind.
pub fn fix_source_path_for(value: &str, windows: bool) -> String {
    if value.contains("//") {
        return value.to_string();
    }
    for scheme in SCHEMES {
        let Some(prefix) = value.get(..scheme.len() + 1) else {
            continue;
        };
        if !prefix[..scheme.len()].eq_ignore_ascii_case(scheme) || !prefix.ends_with('/') {
            continue;
        }
        let separator = if *scheme == "file:" && !windows {
            "///"
        } else {
            "//"
        };
        let rest = &value[scheme.len() + 1..];
        return format!("{}{}{}", &value[..scheme.len()], separator, rest);
    }
    value.to_string()
}
