//! Reading and writing dependency graph documents.

use std::fmt;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::graph_spec::{DependencyGraphSpec, PathComparer};
use crate::json::error::{in_file, FileFormatError};
use crate::json::reader::PackageSpecDoc;
use crate::json::wire::KeySet;
use crate::json::{parse_document, writer, ReaderKind};
use crate::util::fs::write_atomic;
use crate::util::hash::sha256_str;

/// The top-level graph document.
#[derive(Debug, Default)]
pub(crate) struct GraphDoc {
    restore: Vec<String>,
    projects: IndexMap<String, PackageSpecDoc>,
    extensions: Map<String, Value>,
}

impl<'de> Deserialize<'de> for GraphDoc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GraphDocVisitor;

        impl<'de> Visitor<'de> for GraphDocVisitor {
            type Value = GraphDoc;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a dependency graph object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<GraphDoc, A::Error> {
                let mut doc = GraphDoc::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "format" => {
                            map.next_value::<IgnoredAny>()?;
                        }
                        "restore" => {
                            let names: Option<KeySet> = map.next_value()?;
                            doc.restore = names.unwrap_or_default().0;
                        }
                        "projects" => {
                            let projects: Option<IndexMap<String, PackageSpecDoc>> =
                                map.next_value()?;
                            doc.projects = projects.unwrap_or_default();
                        }
                        _ => {
                            let value: Value = map.next_value()?;
                            doc.extensions.insert(key, value);
                        }
                    }
                }
                Ok(doc)
            }
        }

        deserializer.deserialize_map(GraphDocVisitor)
    }
}

impl GraphDoc {
    fn into_graph(self, comparer: PathComparer) -> DependencyGraphSpec {
        let mut graph = DependencyGraphSpec::with_comparer(comparer);
        for (key, doc) in self.projects {
            graph.add_project(doc.into_spec(Some(&key)));
        }
        for name in &self.restore {
            graph.add_restore(name);
        }
        *graph.extensions_mut() = self.extensions;
        graph
    }
}

/// Read a graph document from text.
pub fn read_graph(
    text: &str,
    comparer: PathComparer,
    kind: ReaderKind,
) -> Result<DependencyGraphSpec, FileFormatError> {
    let doc: GraphDoc = parse_document(text, kind)?;
    Ok(doc.into_graph(comparer))
}

/// Read a graph document from an already parsed value. Errors carry no
/// position.
pub fn read_graph_value(
    value: Value,
    comparer: PathComparer,
) -> Result<DependencyGraphSpec, FileFormatError> {
    let doc = GraphDoc::deserialize(value)?;
    Ok(doc.into_graph(comparer))
}

impl DependencyGraphSpec {
    /// Load a graph document from a file.
    pub fn load(path: &Path) -> Result<Self, FileFormatError> {
        Self::load_with(path, PathComparer::platform())
    }

    pub fn load_with(path: &Path, comparer: PathComparer) -> Result<Self, FileFormatError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FileFormatError::new(format!("failed to read file: {}", e)).with_path(path)
        })?;
        read_graph(&text, comparer, ReaderKind::Streaming).map_err(|e| in_file(e, path))
    }

    /// Load a graph document from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self, FileFormatError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| FileFormatError::new(format!("failed to read document: {}", e)))?;
        Self::load_str(&text)
    }

    /// Load a graph document from text.
    pub fn load_str(text: &str) -> Result<Self, FileFormatError> {
        read_graph(text, PathComparer::platform(), ReaderKind::Streaming)
    }

    /// Load a graph document from a parsed JSON value.
    pub fn load_value(value: Value) -> Result<Self, FileFormatError> {
        read_graph_value(value, PathComparer::platform())
    }

    /// The document as a JSON value.
    pub fn to_json(&self) -> Value {
        writer::graph_to_value(self)
    }

    /// The document as indented JSON text, ending with a newline.
    pub fn to_json_string(&self) -> String {
        let mut text = format!("{:#}", self.to_json());
        text.push('\n');
        text
    }

    /// Write the document to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        write_atomic(path, self.to_json_string().as_bytes())
    }

    /// SHA-256 of the compact document: equal graphs hash equally.
    pub fn hash(&self) -> String {
        sha256_str(&self.to_json().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dependency::{LibraryDependency, LibraryRange};
    use crate::core::flags::LibraryIncludeFlags;
    use crate::core::framework::NuGetFramework;
    use crate::core::package_spec::{PackageSpec, TargetFrameworkInformation};
    use crate::core::restore_metadata::{
        ProjectRestoreMetadataFrameworkInfo, ProjectRestoreReference, ProjectStyle,
    };
    use crate::core::version::{NuGetVersion, VersionRange};
    use tempfile::TempDir;

    fn sample() -> DependencyGraphSpec {
        let net472 = NuGetFramework::parse("net472").unwrap();
        let mut a = PackageSpec::new("A");
        a.version = NuGetVersion::parse("24.5.1.2-alpha.1.2+a.b.c").unwrap();
        a.restore_metadata.project_unique_name = "/src/A/A.csproj".into();
        a.restore_metadata.project_name = "A".into();
        a.restore_metadata.project_path = "/src/A/A.csproj".into();
        a.restore_metadata.project_style = ProjectStyle::PackageReference;
        a.restore_metadata.fallback_folders = vec!["/z".into(), "/a".into()];
        a.restore_metadata.config_file_paths = vec!["/b/NuGet.Config".into(), "/a/NuGet.Config".into()];
        a.restore_metadata.sources = vec!["https://api.nuget.org/v3/index.json".into()];
        let mut info = ProjectRestoreMetadataFrameworkInfo::new(net472.clone());
        let mut reference = ProjectRestoreReference::new("/src/B/B.csproj", "/src/B/B.csproj");
        reference.include_assets = LibraryIncludeFlags::RUNTIME;
        reference.exclude_assets = LibraryIncludeFlags::BUILD;
        reference.private_assets = LibraryIncludeFlags::all();
        info.project_references.push(reference);
        a.restore_metadata.target_frameworks.push(info);
        let mut tfi = TargetFrameworkInformation::new(net472);
        tfi.dependencies.push(LibraryDependency::new(LibraryRange::package(
            "Newtonsoft.Json",
            Some(VersionRange::parse("[13.0.1, )").unwrap()),
        )));
        a.target_frameworks.push(tfi);

        let mut b = PackageSpec::new("B");
        b.restore_metadata.project_unique_name = "/src/B/B.csproj".into();
        b.restore_metadata.project_path = "/src/B/B.csproj".into();
        b.restore_metadata.project_style = ProjectStyle::PackageReference;

        let mut graph = DependencyGraphSpec::with_comparer(PathComparer::Sensitive);
        graph.add_project(a);
        graph.add_project(b);
        graph.add_restore("/src/A/A.csproj");
        graph
    }

    #[test]
    fn test_round_trip() {
        let graph = sample();
        let text = graph.to_json_string();
        let read = read_graph(&text, PathComparer::Sensitive, ReaderKind::Streaming).unwrap();
        assert_eq!(read, graph);
        assert_eq!(read.to_json_string(), text);

        let a = read.get_project_spec("/src/A/A.csproj").unwrap();
        assert_eq!(a.version.to_string(), "24.5.1.2-alpha.1.2+a.b.c");
        assert_eq!(a.restore_metadata.fallback_folders, ["/z", "/a"]);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("restore.dg");
        let graph = sample();
        graph.save(&path).unwrap();

        let loaded = DependencyGraphSpec::load_with(&path, PathComparer::Sensitive).unwrap();
        assert_eq!(loaded, graph);
        assert_eq!(loaded.hash(), graph.hash());
    }

    #[test]
    fn test_unknown_top_level_properties_survive() {
        let text = r#"{"format": 1, "restore": {}, "projects": {}, "adapter": {"x": [1, 2]}}"#;
        let graph = read_graph(text, PathComparer::Sensitive, ReaderKind::Streaming).unwrap();
        assert_eq!(graph.to_json()["adapter"]["x"][1], 2);
    }

    #[test]
    fn test_leading_comment_is_skipped() {
        let text = "/* generated\n by a tool */\n{\"restore\": {\"a\": {}}}";
        let graph = read_graph(text, PathComparer::Sensitive, ReaderKind::Streaming).unwrap();
        assert_eq!(graph.restore().collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn test_top_level_must_be_object() {
        for (text, line) in [("", 1), ("[]", 1), ("\n\n42", 3), ("{\"projects\": ", 1)] {
            let err = read_graph(text, PathComparer::Sensitive, ReaderKind::Streaming).unwrap_err();
            assert_eq!(err.line, line, "{text:?}");
        }
    }

    #[test]
    fn test_error_position_survives_comment() {
        let text = "/* one\ntwo */ {\n \"restore\": 5 }";
        let err = read_graph(text, PathComparer::Sensitive, ReaderKind::Streaming).unwrap_err();
        assert_eq!(err.line, 3);
    }

    const SMALL: &str = r#"{"format": 1, "restore": {"a": {}}, "projects": {"a": {"version": "2.0.0"}}}"#;

    #[test]
    fn test_load_str() {
        let graph = DependencyGraphSpec::load_str(SMALL).unwrap();
        assert!(graph.is_restore_root("a"));
        assert_eq!(graph.get_project_spec("a").unwrap().version.to_string(), "2.0.0");

        let err = DependencyGraphSpec::load_str("\n  [1]").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("invalid type"));

        let commented = format!("/* header\n */ {}", SMALL);
        assert_eq!(DependencyGraphSpec::load_str(&commented).unwrap(), graph);
    }

    #[test]
    fn test_load_reader() {
        let graph = DependencyGraphSpec::load_reader(SMALL.as_bytes()).unwrap();
        assert_eq!(graph.restore().collect::<Vec<_>>(), ["a"]);

        let err = DependencyGraphSpec::load_reader("\n\n\"text\"".as_bytes()).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.has_position());

        let commented = format!("/* header */\n{}", SMALL);
        let read = DependencyGraphSpec::load_reader(std::io::Cursor::new(commented)).unwrap();
        assert_eq!(read, graph);
    }

    #[test]
    fn test_load_value() {
        let value: Value = serde_json::from_str(SMALL).unwrap();
        let graph = DependencyGraphSpec::load_value(value).unwrap();
        assert_eq!(graph, DependencyGraphSpec::load_str(SMALL).unwrap());

        let err = DependencyGraphSpec::load_value(Value::from(42)).unwrap_err();
        assert!(err.message.contains("invalid type"));
        assert!(!err.has_position());
    }

    #[test]
    fn test_load_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.dg");
        std::fs::write(&path, "{ nope").unwrap();
        let err = DependencyGraphSpec::load(&path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(err.has_position());
    }
}
