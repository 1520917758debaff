//! Port traits abstracting all I/O away from the batch driver.

use camino::{Utf8Path, Utf8PathBuf};
use docfix_schema::DataVersion;
use docfix_value::Value;

/// Encoding of documents at rest.
pub trait DocumentCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Value>;
    fn encode(&self, value: &Value) -> anyhow::Result<Vec<u8>>;
}

/// Where a decoded document records its format version.
pub trait VersionReader: Send + Sync {
    /// Stored version, or `None` when the document does not say.
    fn read_version(&self, document: &Value) -> Option<DataVersion>;

    /// Writes `version` into the document.
    fn stamp_version(&self, document: &Value, version: DataVersion) -> Value;
}

/// A raw document and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: Utf8PathBuf,
    pub bytes: Vec<u8>,
}

/// Source of documents to migrate.
pub trait DocumentSource {
    fn load_documents(&self) -> anyhow::Result<Vec<SourceDocument>>;
}

/// Destination for migrated documents.
pub trait DocumentSink {
    fn write_document(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
}
