//! Default port implementations: JSON codec, version field, filesystem and in-memory I/O.

use crate::ports::{DocumentCodec, DocumentSink, DocumentSource, SourceDocument, VersionReader};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use docfix_schema::DataVersion;
use docfix_value::Value;
use fs_err as fs;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::debug;

/// JSON documents via `serde_json`.
///
/// Integers stay integers, non-finite floats encode as `null` and byte arrays as arrays of
/// signed ints.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pub pretty: bool,
}

impl JsonCodec {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl DocumentCodec for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Value> {
        let json: serde_json::Value = serde_json::from_slice(bytes).context("invalid JSON")?;
        Ok(Value::from(json))
    }

    fn encode(&self, value: &Value) -> anyhow::Result<Vec<u8>> {
        let json = serde_json::Value::from(value);
        let mut out = if self.pretty {
            serde_json::to_vec_pretty(&json)?
        } else {
            serde_json::to_vec(&json)?
        };
        out.push(b'\n');
        Ok(out)
    }
}

/// Default name of the version field.
pub const DEFAULT_VERSION_FIELD: &str = "DataVersion";

/// Reads the stored version from a top-level field.
///
/// Integer fields are whole versions; strings may carry a sub-version (`"12.1"`). A missing
/// or unreadable field yields `default`.
#[derive(Debug, Clone)]
pub struct FieldVersionReader {
    pub field: String,
    pub default: Option<DataVersion>,
}

impl FieldVersionReader {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: Option<DataVersion>) -> Self {
        self.default = default;
        self
    }
}

impl Default for FieldVersionReader {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_FIELD)
    }
}

impl VersionReader for FieldVersionReader {
    fn read_version(&self, document: &Value) -> Option<DataVersion> {
        let stored = match document.field(&self.field) {
            Some(Value::Int(n)) => u32::try_from(*n).ok().map(DataVersion::from),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        };
        stored.or(self.default)
    }

    fn stamp_version(&self, document: &Value, version: DataVersion) -> Value {
        let stamped = if version.sub == 0 {
            Value::from(i64::from(version.version))
        } else {
            Value::from(version.to_string())
        };
        document.set(self.field.as_str(), stamped)
    }
}

/// Loads documents from files. Directories contribute their `*.json` files, sorted by name.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    pub paths: Vec<Utf8PathBuf>,
}

impl FsDocumentSource {
    pub fn new(paths: Vec<Utf8PathBuf>) -> Self {
        Self { paths }
    }

    fn expand(&self) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let mut out = Vec::new();
        for path in &self.paths {
            if !path.is_dir() {
                out.push(path.clone());
                continue;
            }
            let mut found = Vec::new();
            for entry in fs::read_dir(path)? {
                let entry = entry.with_context(|| format!("list {}", path))?;
                let child = Utf8PathBuf::try_from(entry.path())
                    .with_context(|| format!("non UTF-8 path under {}", path))?;
                if child.is_file() && child.extension() == Some("json") {
                    found.push(child);
                }
            }
            found.sort();
            debug!(dir = %path, files = found.len(), "expanded document directory");
            out.extend(found);
        }
        Ok(out)
    }
}

impl DocumentSource for FsDocumentSource {
    fn load_documents(&self) -> anyhow::Result<Vec<SourceDocument>> {
        self.expand()?
            .into_iter()
            .map(|path| {
                let bytes = fs::read(&path).with_context(|| format!("read {}", path))?;
                Ok(SourceDocument { path, bytes })
            })
            .collect()
    }
}

/// In-memory document source for embedding and testing. Sorted by path on construction.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentSource {
    documents: Vec<SourceDocument>,
}

impl InMemoryDocumentSource {
    pub fn new(mut documents: Vec<SourceDocument>) -> Self {
        documents.sort_by(|a, b| a.path.cmp(&b.path));
        Self { documents }
    }
}

impl DocumentSource for InMemoryDocumentSource {
    fn load_documents(&self) -> anyhow::Result<Vec<SourceDocument>> {
        Ok(self.documents.clone())
    }
}

/// Writes documents to the filesystem, creating parent directories.
#[derive(Debug, Clone, Default)]
pub struct FsDocumentSink;

impl DocumentSink for FsDocumentSink {
    fn write_document(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }
}

/// Collects written documents in memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentSink {
    files: Mutex<BTreeMap<Utf8PathBuf, Vec<u8>>>,
}

impl InMemoryDocumentSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn files(&self) -> BTreeMap<Utf8PathBuf, Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DocumentSink for InMemoryDocumentSink {
    fn write_document(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        self.files
            .lock()
            .map_err(|_| anyhow::anyhow!("document sink lock poisoned"))?
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn json_codec_keeps_ints_and_key_order() {
        let codec = JsonCodec::default();
        let value = codec.decode(br#"{"b": 1, "a": 2.5, "c": [true]}"#).unwrap();
        assert_eq!(value.field("b"), Some(&Value::Int(1)));
        assert_eq!(value.field("a"), Some(&Value::Float(2.5)));
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\"b\":1,\"a\":2.5,\"c\":[true]}\n");
    }

    #[test]
    fn json_codec_rejects_garbage() {
        let err = JsonCodec::default().decode(b"{not json").unwrap_err();
        assert!(format!("{err:#}").contains("invalid JSON"));
    }

    #[test]
    fn version_reader_handles_ints_strings_and_defaults() {
        let reader = FieldVersionReader::default();
        let int = Value::map_of([("DataVersion", Value::from(12))]);
        let sub = Value::map_of([("DataVersion", Value::from("12.1"))]);
        let missing = Value::empty_map();
        let negative = Value::map_of([("DataVersion", Value::from(-4))]);

        assert_eq!(reader.read_version(&int), Some(DataVersion::from(12u32)));
        assert_eq!(reader.read_version(&sub), Some(DataVersion::new(12, 1)));
        assert_eq!(reader.read_version(&missing), None);
        assert_eq!(reader.read_version(&negative), None);

        let reader = reader.with_default(Some(DataVersion::from(10u32)));
        assert_eq!(reader.read_version(&missing), Some(DataVersion::from(10u32)));
    }

    #[test]
    fn stamping_writes_ints_for_whole_versions() {
        let reader = FieldVersionReader::new("v");
        let doc = Value::map_of([("x", Value::Null)]);
        let whole = reader.stamp_version(&doc, DataVersion::from(15u32));
        assert_eq!(whole.field("v"), Some(&Value::Int(15)));
        let sub = reader.stamp_version(&doc, DataVersion::new(12, 1));
        assert_eq!(sub.field("v"), Some(&Value::from("12.1")));
    }

    #[test]
    fn fs_source_expands_directories_in_order() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        std::fs::write(root.join("b.json"), "{}").unwrap();
        std::fs::write(root.join("a.json"), "{}").unwrap();
        std::fs::write(root.join("notes.txt"), "skip").unwrap();

        let source = FsDocumentSource::new(vec![root.clone()]);
        let docs = source.load_documents().unwrap();
        let names: Vec<_> = docs.iter().filter_map(|d| d.path.file_name()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn fs_source_reports_missing_files() {
        let source = FsDocumentSource::new(vec![Utf8PathBuf::from("does/not/exist.json")]);
        let err = source.load_documents().unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.json"));
    }

    #[test]
    fn fs_sink_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let path = root.join("out").join("doc.json");
        FsDocumentSink.write_document(&path, b"{}\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn in_memory_source_sorts_by_path() {
        let doc = |p: &str| SourceDocument {
            path: Utf8PathBuf::from(p),
            bytes: Vec::new(),
        };
        let source = InMemoryDocumentSource::new(vec![doc("z.json"), doc("a.json")]);
        let paths: Vec<_> = source
            .load_documents()
            .unwrap()
            .into_iter()
            .map(|d| d.path)
            .collect();
        assert_eq!(paths, vec![Utf8PathBuf::from("a.json"), Utf8PathBuf::from("z.json")]);
    }
}
