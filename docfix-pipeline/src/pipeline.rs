use crate::{Fix, MigrationError, Migrated, Migration, PipelineError};
use docfix_schema::{DataVersion, Reference, ReferenceRegistry};
use docfix_value::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// The ordered catalog of fixes. Built once, then shared read-only across threads.
#[derive(Debug, Clone)]
pub struct FixPipeline {
    registry: ReferenceRegistry,
    fixes: Vec<Fix>,
}

impl FixPipeline {
    /// Sorts `fixes` by version (registration order breaks ties) and validates the chain.
    pub fn build(
        registry: &ReferenceRegistry,
        fixes: impl IntoIterator<Item = Fix>,
    ) -> Result<FixPipeline, PipelineError> {
        let mut fixes: Vec<Fix> = fixes.into_iter().collect();

        let mut seen = BTreeSet::new();
        for fix in &fixes {
            let (input, output) = (fix.input().version(), fix.output().version());
            if fix.version() != output || input >= output {
                return Err(PipelineError::SchemaVersionMismatch {
                    name: fix.name().to_string(),
                    version: fix.version(),
                    input,
                    output,
                });
            }
            if !seen.insert((fix.version(), fix.name().to_string())) {
                return Err(PipelineError::DuplicateFix {
                    name: fix.name().to_string(),
                    version: fix.version(),
                });
            }
            if let Some(missing) = fix.rule().targets().iter().find(|r| !registry.contains(r)) {
                return Err(PipelineError::UnregisteredReference {
                    fix: fix.name().to_string(),
                    reference: missing.name().to_string(),
                });
            }
        }

        fixes.sort_by_key(Fix::version);

        for pair in fixes.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            // Schemas chain by identity; an independently built schema with the same
            // version is a different schema.
            let same_step = Arc::ptr_eq(prev.input(), next.input())
                && Arc::ptr_eq(prev.output(), next.output());
            if !same_step && !Arc::ptr_eq(next.input(), prev.output()) {
                return Err(PipelineError::NonContiguousSchemaChain {
                    previous: prev.name().to_string(),
                    next: next.name().to_string(),
                    expected: prev.output().version(),
                    found: next.input().version(),
                });
            }
        }

        debug!(
            fixes = fixes.len(),
            max_version = ?fixes.last().map(Fix::version),
            "fix pipeline built"
        );
        Ok(FixPipeline {
            registry: registry.clone(),
            fixes,
        })
    }

    pub fn registry(&self) -> &ReferenceRegistry {
        &self.registry
    }

    /// Fixes in application order.
    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    /// Newest version any fix produces. `None` for an empty pipeline.
    pub fn max_version(&self) -> Option<DataVersion> {
        self.fixes.last().map(Fix::version)
    }

    /// Fixes newer than `stored`, up to and including `target`.
    pub(crate) fn pending(&self, stored: DataVersion, target: DataVersion) -> &[Fix] {
        let start = self.fixes.partition_point(|f| f.version() <= stored);
        let end = self.fixes.partition_point(|f| f.version() <= target);
        if start >= end {
            &[]
        } else {
            &self.fixes[start..end]
        }
    }

    /// Starts a step-wise migration to the newest known version.
    pub fn start(&self, reference: &Reference, document: Value, stored: DataVersion) -> Migration<'_> {
        let target = self.max_version().unwrap_or(stored);
        Migration::new(self, reference, document, stored, target)
    }

    /// Starts a step-wise migration that stops at `target`.
    pub fn start_to(
        &self,
        reference: &Reference,
        document: Value,
        stored: DataVersion,
        target: DataVersion,
    ) -> Migration<'_> {
        Migration::new(self, reference, document, stored, target)
    }

    /// Applies every fix newer than `stored`, in order.
    pub fn migrate(
        &self,
        reference: &Reference,
        document: Value,
        stored: impl Into<DataVersion>,
    ) -> Result<Migrated, MigrationError> {
        self.start(reference, document, stored.into()).run()
    }

    /// Like [`FixPipeline::migrate`], but stops after the fixes at `target`.
    pub fn migrate_to(
        &self,
        reference: &Reference,
        document: Value,
        stored: impl Into<DataVersion>,
        target: impl Into<DataVersion>,
    ) -> Result<Migrated, MigrationError> {
        self.start_to(reference, document, stored.into(), target.into())
            .run()
    }
}

#[cfg(test)]
mod tests {
    use super::FixPipeline;
    use crate::{Fix, PipelineError};
    use docfix_rewrite::Rule;
    use docfix_schema::{DataVersion, ReferenceRegistry, Schema, Shape, Type};
    use docfix_value::Value;
    use std::sync::Arc;

    fn chain() -> (ReferenceRegistry, Vec<Arc<Schema>>) {
        let mut registry = ReferenceRegistry::new();
        let player = registry.register("player", Shape::Record).unwrap();
        let v10 = Schema::build(10u32, None)
            .register(&player, Type::Opaque)
            .build()
            .unwrap();
        let v11 = Schema::same(11u32, &v10).unwrap();
        let v12 = Schema::same(12u32, &v11).unwrap();
        (registry, vec![v10, v11, v12])
    }

    #[test]
    fn fixes_are_sorted_by_version() {
        let (registry, s) = chain();
        let pipeline = FixPipeline::build(
            &registry,
            [
                Fix::define("b", 12u32, &s[1], &s[2], Rule::Nop),
                Fix::define("a", 11u32, &s[0], &s[1], Rule::Nop),
            ],
        )
        .unwrap();
        let names: Vec<_> = pipeline.fixes().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(pipeline.max_version(), Some(DataVersion::from(12u32)));
    }

    #[test]
    fn gap_in_chain_is_rejected() {
        let (registry, s) = chain();
        let err = FixPipeline::build(
            &registry,
            [
                Fix::define("a", 11u32, &s[0], &s[1], Rule::Nop),
                Fix::define("c", 12u32, &s[0], &s[2], Rule::Nop),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::NonContiguousSchemaChain { .. }));
    }

    #[test]
    fn equal_versions_from_another_chain_do_not_connect() {
        let (registry, s) = chain();
        let stranger = Schema::same(11u32, &s[0]).unwrap();
        let err = FixPipeline::build(
            &registry,
            [
                Fix::define("a", 11u32, &s[0], &s[1], Rule::Nop),
                Fix::define("b", 12u32, &stranger, &s[2], Rule::Nop),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::NonContiguousSchemaChain { .. }));

        let split = FixPipeline::build(
            &registry,
            [
                Fix::define("x", 11u32, &s[0], &s[1], Rule::Nop),
                Fix::define("y", 11u32, &s[0], &stranger, Rule::Nop),
            ],
        )
        .unwrap_err();
        assert!(matches!(split, PipelineError::NonContiguousSchemaChain { .. }));
    }

    #[test]
    fn same_step_fixes_share_a_version() {
        let (registry, s) = chain();
        let pipeline = FixPipeline::build(
            &registry,
            [
                Fix::define("x", 11u32, &s[0], &s[1], Rule::Nop),
                Fix::define("y", 11u32, &s[0], &s[1], Rule::Nop),
            ],
        )
        .unwrap();
        assert_eq!(pipeline.fixes().len(), 2);
    }

    #[test]
    fn duplicate_and_mismatched_fixes_are_rejected() {
        let (registry, s) = chain();
        let dup = FixPipeline::build(
            &registry,
            [
                Fix::define("x", 11u32, &s[0], &s[1], Rule::Nop),
                Fix::define("x", 11u32, &s[0], &s[1], Rule::Nop),
            ],
        )
        .unwrap_err();
        assert!(matches!(dup, PipelineError::DuplicateFix { .. }));

        let wrong = FixPipeline::build(&registry, [Fix::define("x", 12u32, &s[0], &s[1], Rule::Nop)])
            .unwrap_err();
        assert!(matches!(wrong, PipelineError::SchemaVersionMismatch { .. }));

        let backwards = FixPipeline::build(&registry, [Fix::define("x", 10u32, &s[1], &s[0], Rule::Nop)])
            .unwrap_err();
        assert!(matches!(backwards, PipelineError::SchemaVersionMismatch { .. }));
    }

    #[test]
    fn unregistered_target_is_rejected() {
        let (registry, s) = chain();
        let mut other = ReferenceRegistry::new();
        let chunk = other.register("chunk", Shape::Record).unwrap();
        let err = FixPipeline::build(
            &registry,
            [Fix::define("x", 11u32, &s[0], &s[1], Rule::convert(&chunk, |_| Ok(None)))],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::UnregisteredReference { .. }));
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let (registry, _) = chain();
        let pipeline = FixPipeline::build(&registry, Vec::<Fix>::new()).unwrap();
        let player = registry.get("player").cloned().unwrap();
        let out = pipeline.migrate(&player, Value::from(1), 3u32).unwrap();
        assert_eq!(out.value, Value::from(1));
        assert_eq!(out.version, DataVersion::from(3u32));
    }
}
