//! Build items: flat property bags emitted by project evaluation.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One unit of build metadata, e.g. a project, a package reference or a
/// framework group. The kind is given by its `Type` property.
pub trait MsBuildItem {
    /// The item identity. Several items may share one.
    fn identity(&self) -> &str;

    /// Property names in declaration order.
    fn properties(&self) -> Vec<&str>;

    /// A property value. Names compare case-insensitively; values are
    /// trimmed and blank values read as absent.
    fn property(&self, key: &str) -> Option<&str>;

    /// The `Type` property.
    fn item_type(&self) -> Option<&str> {
        self.property("Type")
    }

    /// Check the item type, ignoring case.
    fn is_type(&self, item_type: &str) -> bool {
        self.item_type()
            .is_some_and(|t| t.eq_ignore_ascii_case(item_type))
    }
}

/// A build item backed by an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyItem {
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

impl PropertyItem {
    pub fn new(identity: impl Into<String>) -> Self {
        PropertyItem {
            identity: identity.into(),
            properties: IndexMap::new(),
        }
    }

    /// Add a property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Start an item of the given `Type`.
    pub fn of_type(item_type: &str, identity: impl Into<String>) -> Self {
        PropertyItem::new(identity).with("Type", item_type)
    }
}

impl MsBuildItem for PropertyItem {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn properties(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Read a JSON item file: `[{"identity": "...", "properties": {...}}]`.
pub fn load_items(path: &Path) -> Result<Vec<PropertyItem>> {
    let text = crate::util::fs::read_to_string(path)?;
    parse_items(&text).with_context(|| format!("failed to parse item file: {}", path.display()))
}

/// Parse JSON item text.
pub fn parse_items(text: &str) -> Result<Vec<PropertyItem>> {
    let text = crate::json::strip_leading_comments(text);
    Ok(serde_json::from_str(&text)?)
}
