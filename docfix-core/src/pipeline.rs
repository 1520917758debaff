//! Batch migrate pipeline, extracted from the CLI.
//!
//! The entry point is I/O-agnostic: documents come from a [`DocumentSource`], go out through
//! a [`DocumentSink`], and are decoded and versioned through the codec and version ports.

use crate::ports::{DocumentCodec, DocumentSink, DocumentSource, SourceDocument, VersionReader};
use crate::settings::{MigrateSettings, OutputMode};
use anyhow::Context;
use camino::Utf8PathBuf;
use docfix_pipeline::FixPipeline;
use docfix_schema::{DataVersion, Reference};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Error type for pipeline results. Per-document failures are not errors; they are
/// reported in the [`MigrateOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown reference `{name}` (registered: {available})")]
    UnknownReference { name: String, available: String },
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Migrated {
        from: DataVersion,
        to: DataVersion,
        applied: usize,
    },
    /// Already at (or past) the target version.
    Unchanged { version: DataVersion },
    Failed { reason: String },
}

/// Per-document result.
#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub path: Utf8PathBuf,
    pub status: DocumentStatus,
    /// Encoded output; `None` for failed documents.
    pub output: Option<Vec<u8>>,
    /// Where the output was written, if anywhere.
    pub written_to: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrateSummary {
    pub migrated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Outcome of `run_migrate`, in source order.
#[derive(Debug, Clone)]
pub struct MigrateOutcome {
    pub documents: Vec<DocumentResult>,
    pub summary: MigrateSummary,
}

impl MigrateOutcome {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

/// Run the migrate pipeline over every document of `source`.
///
/// Documents are decoded and migrated in parallel; a document that cannot be decoded,
/// has no readable version, or fails a fix is reported as failed and not written. Writes
/// happen afterwards in source order.
pub fn run_migrate(
    settings: &MigrateSettings,
    pipeline: &FixPipeline,
    source: &dyn DocumentSource,
    sink: &dyn DocumentSink,
    codec: &dyn DocumentCodec,
    reader: &dyn VersionReader,
) -> Result<MigrateOutcome, ToolError> {
    let Some(reference) = pipeline.registry().get(&settings.reference) else {
        let available: Vec<&str> = pipeline.registry().iter().map(|r| r.name()).collect();
        return Err(ToolError::UnknownReference {
            name: settings.reference.clone(),
            available: available.join(", "),
        });
    };

    let documents = source.load_documents()?;
    debug!(
        documents = documents.len(),
        reference = reference.name(),
        "loaded documents"
    );

    let job = MigrateJob {
        settings,
        pipeline,
        reference,
        codec,
        reader,
    };
    let migrated: Vec<DocumentResult> = match settings.jobs {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("build worker pool")?;
            pool.install(|| documents.par_iter().map(|d| job.run(d)).collect())
        }
        None => documents.par_iter().map(|d| job.run(d)).collect(),
    };

    let mut results = Vec::with_capacity(migrated.len());
    let mut summary = MigrateSummary::default();
    for mut result in migrated {
        match &result.status {
            DocumentStatus::Migrated { .. } => summary.migrated += 1,
            DocumentStatus::Unchanged { .. } => summary.unchanged += 1,
            DocumentStatus::Failed { reason } => {
                warn!(path = %result.path, reason = %reason, "document failed to migrate");
                summary.failed += 1;
            }
        }
        if let Some(target) = output_path(&settings.output, &result)
            && let Some(bytes) = &result.output
        {
            sink.write_document(&target, bytes)?;
            result.written_to = Some(target);
        }
        results.push(result);
    }

    info!(
        migrated = summary.migrated,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "migration finished"
    );
    Ok(MigrateOutcome {
        documents: results,
        summary,
    })
}

/// Everything a worker needs to migrate one document.
struct MigrateJob<'a> {
    settings: &'a MigrateSettings,
    pipeline: &'a FixPipeline,
    reference: &'a Reference,
    codec: &'a dyn DocumentCodec,
    reader: &'a dyn VersionReader,
}

impl MigrateJob<'_> {
    fn run(&self, document: &SourceDocument) -> DocumentResult {
        match self.migrate(document) {
            Ok((status, output)) => DocumentResult {
                path: document.path.clone(),
                status,
                output: Some(output),
                written_to: None,
            },
            Err(err) => DocumentResult {
                path: document.path.clone(),
                status: DocumentStatus::Failed {
                    reason: format!("{err:#}"),
                },
                output: None,
                written_to: None,
            },
        }
    }

    fn migrate(&self, document: &SourceDocument) -> anyhow::Result<(DocumentStatus, Vec<u8>)> {
        let value = self.codec.decode(&document.bytes)?;
        let stored = self
            .settings
            .from_version
            .or_else(|| self.reader.read_version(&value))
            .with_context(|| {
                format!(
                    "no readable `{}` field and no default version",
                    self.settings.version_field
                )
            })?;

        let migrated = match self.settings.target_version {
            Some(target) => self
                .pipeline
                .migrate_to(self.reference, value, stored, target)?,
            None => self.pipeline.migrate(self.reference, value, stored)?,
        };
        debug!(
            path = %document.path,
            from = %stored,
            to = %migrated.version,
            applied = migrated.applied,
            "migrated document"
        );

        if migrated.applied == 0 {
            let output = self.codec.encode(&migrated.value)?;
            return Ok((DocumentStatus::Unchanged { version: stored }, output));
        }
        let value = if self.settings.stamp_version {
            self.reader.stamp_version(&migrated.value, migrated.version)
        } else {
            migrated.value
        };
        let status = DocumentStatus::Migrated {
            from: stored,
            to: migrated.version,
            applied: migrated.applied,
        };
        Ok((status, self.codec.encode(&value)?))
    }
}

/// In-place runs only rewrite documents that changed; directory runs copy everything
/// that did not fail.
fn output_path(mode: &OutputMode, result: &DocumentResult) -> Option<Utf8PathBuf> {
    match (mode, &result.status) {
        (_, DocumentStatus::Failed { .. }) | (OutputMode::DryRun, _) => None,
        (OutputMode::InPlace, DocumentStatus::Migrated { .. }) => Some(result.path.clone()),
        (OutputMode::InPlace, DocumentStatus::Unchanged { .. }) => None,
        (OutputMode::Directory(dir), _) => Some(match result.path.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(&result.path),
        }),
    }
}
