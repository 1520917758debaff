//! Clap-free settings for the migrate pipeline.

use crate::adapters::DEFAULT_VERSION_FIELD;
use camino::Utf8PathBuf;
use docfix_schema::DataVersion;

/// Where migrated documents go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Keep results in the outcome only.
    #[default]
    DryRun,
    /// Overwrite each source file.
    InPlace,
    /// Write `<dir>/<file name>` for each source file.
    Directory(Utf8PathBuf),
}

/// Settings for [`run_migrate`](crate::pipeline::run_migrate).
#[derive(Debug, Clone)]
pub struct MigrateSettings {
    /// Registered reference name every document is typed as.
    pub reference: String,

    // Versions
    pub version_field: String,
    /// Version assumed for documents that do not record one.
    pub default_version: Option<DataVersion>,
    /// Overrides whatever the documents record.
    pub from_version: Option<DataVersion>,
    /// Stop at this version instead of the newest.
    pub target_version: Option<DataVersion>,
    /// Write the resulting version back into the version field.
    pub stamp_version: bool,

    // Output
    pub output: OutputMode,
    pub pretty: bool,

    /// Worker threads; `None` uses the global rayon pool.
    pub jobs: Option<usize>,
}

impl Default for MigrateSettings {
    fn default() -> Self {
        Self {
            reference: String::new(),
            version_field: DEFAULT_VERSION_FIELD.to_string(),
            default_version: None,
            from_version: None,
            target_version: None,
            stamp_version: true,
            output: OutputMode::default(),
            pretty: true,
            jobs: None,
        }
    }
}
