use crate::{Fix, FixPipeline, MigrationError};
use docfix_schema::{DataVersion, Reference};
use docfix_value::Value;
use tracing::{debug, trace};

/// Where a document stands in its migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// Nothing applied yet; the document is at its stored version.
    Unmigrated(DataVersion),
    /// Every fix up to this version has been applied.
    PartiallyMigrated(DataVersion),
    /// Done; the document is valid at this version.
    Migrated(DataVersion),
}

impl MigrationState {
    pub fn version(self) -> DataVersion {
        match self {
            MigrationState::Unmigrated(v)
            | MigrationState::PartiallyMigrated(v)
            | MigrationState::Migrated(v) => v,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, MigrationState::Migrated(_))
    }
}

/// Result of a successful migration.
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    pub value: Value,
    pub version: DataVersion,
    /// Number of fixes that ran.
    pub applied: usize,
}

/// A document moving through a pipeline one fix at a time.
///
/// Fixes registered at one version form a single atomic step. When one of them fails, the
/// value and the pending fixes roll back to the last completed version, so the error's
/// `(partial, applied_version)` pair can be resumed without re-running anything.
#[derive(Debug)]
pub struct Migration<'p> {
    reference: Reference,
    value: Value,
    state: MigrationState,
    pending: &'p [Fix],
    applied: usize,
    final_version: DataVersion,
    /// Value, pending fixes and applied count at the last completed version.
    checkpoint: Value,
    group: &'p [Fix],
    group_applied: usize,
}

impl<'p> Migration<'p> {
    pub(crate) fn new(
        pipeline: &'p FixPipeline,
        reference: &Reference,
        value: Value,
        stored: DataVersion,
        target: DataVersion,
    ) -> Self {
        let pending = pipeline.pending(stored, target);
        let reachable_target = pipeline.max_version().map_or(stored, |max| max.min(target));
        let final_version = stored.max(reachable_target);
        let state = if pending.is_empty() {
            MigrationState::Migrated(final_version)
        } else {
            MigrationState::Unmigrated(stored)
        };
        Migration {
            reference: reference.clone(),
            checkpoint: value.clone(),
            value,
            state,
            pending,
            applied: 0,
            final_version,
            group: pending,
            group_applied: 0,
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The next fix [`Migration::step`] would apply.
    pub fn next_fix(&self) -> Option<&'p Fix> {
        self.pending.first()
    }

    /// Applies the next fix. Returns the fix applied, or `None` once migrated.
    pub fn step(&mut self) -> Result<Option<&'p Fix>, MigrationError> {
        let Some((fix, rest)) = self.pending.split_first() else {
            self.state = MigrationState::Migrated(self.final_version);
            return Ok(None);
        };

        let next = match fix.apply(&self.reference, &self.value) {
            Ok(next) => next,
            Err(source) => {
                self.value = self.checkpoint.clone();
                self.pending = self.group;
                self.applied = self.group_applied;
                return Err(MigrationError {
                    fix: fix.name().to_string(),
                    fix_version: fix.version(),
                    applied_version: self.state.version(),
                    partial: self.checkpoint.clone(),
                    source,
                });
            }
        };

        trace!(fix = %fix.name(), version = %fix.version(), "fix applied");
        self.value = next;
        self.pending = rest;
        self.applied += 1;
        // Same-version fixes form one step; the version is only complete after the last.
        let version_done = rest
            .first()
            .is_none_or(|following| following.version() != fix.version());
        if version_done {
            self.state = if rest.is_empty() {
                MigrationState::Migrated(self.final_version)
            } else {
                MigrationState::PartiallyMigrated(fix.version())
            };
            self.checkpoint = self.value.clone();
            self.group = rest;
            self.group_applied = self.applied;
        }
        Ok(Some(fix))
    }

    /// Steps until migrated or a fix fails.
    pub fn run(mut self) -> Result<Migrated, MigrationError> {
        let from = self.state.version();
        while self.step()?.is_some() {}
        debug!(
            reference = %self.reference,
            from = %from,
            to = %self.final_version,
            applied = self.applied,
            "document migrated"
        );
        Ok(Migrated {
            value: self.value,
            version: self.final_version,
            applied: self.applied,
        })
    }
}
