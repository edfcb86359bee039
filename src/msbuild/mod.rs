//! Build items to restore model.
//!
//! Project evaluation emits flat items (see [`MsBuildItem`]); this module
//! turns them into a [`DependencyGraphSpec`](crate::core::DependencyGraphSpec).

pub mod builder;
pub mod central;
pub mod errors;
pub mod item;
pub mod strings;

pub use builder::{build_graph_spec, build_graph_spec_with, BuildOptions};
pub use errors::BuildError;
pub use item::{load_items, parse_items, MsBuildItem, PropertyItem};
pub use strings::fix_source_path;

use crate::core::log_code::LogCode;
use crate::util::diagnostic::{RestoreLogMessage, Severity};

/// Messages recorded by evaluation as `RestoreLogMessage` items, in order.
/// Items without a valid `Code` are skipped.
pub fn log_messages<I: MsBuildItem>(items: &[I]) -> Vec<RestoreLogMessage> {
    items
        .iter()
        .filter(|item| item.is_type("RestoreLogMessage"))
        .filter_map(|item| {
            let code: LogCode = item.property("Code")?.parse().ok()?;
            Some(RestoreLogMessage {
                code,
                level: item.property("Level").map_or(Severity::Warning, Severity::parse),
                message: item.property("Message").unwrap_or_default().to_string(),
                project_path: item
                    .property("ProjectPath")
                    .or_else(|| item.property("FilePath"))
                    .map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_messages() {
        let items = vec![
            PropertyItem::of_type("RestoreLogMessage", "m1")
                .with("Code", "NU1603")
                .with("Level", "Warning")
                .with("Message", "a depends on b")
                .with("FilePath", "/src/a.csproj"),
            PropertyItem::of_type("RestoreLogMessage", "m2").with("Code", "bogus"),
            PropertyItem::of_type("projectSpec", "p").with("Code", "NU1603"),
            PropertyItem::of_type("restorelogmessage", "m3")
                .with("Code", "NU1008")
                .with("Level", "Error"),
        ];
        let messages = log_messages(&items);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].code, LogCode::NU1603);
        assert_eq!(messages[0].project_path.as_deref(), Some("/src/a.csproj"));
        assert_eq!(messages[1].level, Severity::Error);
    }
}
