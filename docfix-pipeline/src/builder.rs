use crate::{Fix, FixPipeline, PipelineError};
use docfix_rewrite::Rule;
use docfix_schema::{DataVersion, ReferenceRegistry, Schema, SchemaBuilder};
use std::sync::Arc;

/// Registers schemas and fixes in version order, the way a catalog reads top to bottom.
///
/// Each schema derives from the previously added one; each fix is bound to the latest
/// schema as output and its parent as input.
#[derive(Debug)]
pub struct PipelineBuilder {
    registry: ReferenceRegistry,
    schemas: Vec<Arc<Schema>>,
    fixes: Vec<Fix>,
}

impl PipelineBuilder {
    pub fn new(registry: ReferenceRegistry) -> Self {
        Self {
            registry,
            schemas: Vec::new(),
            fixes: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ReferenceRegistry {
        &self.registry
    }

    pub fn latest(&self) -> Option<&Arc<Schema>> {
        self.schemas.last()
    }

    /// All schemas added so far, oldest first.
    pub fn schemas(&self) -> &[Arc<Schema>] {
        &self.schemas
    }

    /// Adds a schema derived from the latest one, shaped by `edit`.
    pub fn add_schema(
        &mut self,
        version: impl Into<DataVersion>,
        edit: impl FnOnce(SchemaBuilder) -> SchemaBuilder,
    ) -> Result<Arc<Schema>, PipelineError> {
        let schema = edit(Schema::build(version, self.schemas.last())).build()?;
        self.schemas.push(schema.clone());
        Ok(schema)
    }

    /// Adds a schema identical to the latest one.
    pub fn add_schema_same(
        &mut self,
        version: impl Into<DataVersion>,
    ) -> Result<Arc<Schema>, PipelineError> {
        self.add_schema(version, |s| s)
    }

    /// Adds a fix from the latest schema's parent to the latest schema.
    pub fn add_fix(&mut self, name: &str, rule: Rule) -> Result<(), PipelineError> {
        let Some(output) = self.schemas.last() else {
            return Err(PipelineError::NoParentSchema {
                name: name.to_string(),
            });
        };
        let Some(input) = output.parent() else {
            return Err(PipelineError::NoParentSchema {
                name: name.to_string(),
            });
        };
        let fix = Fix::define(name, output.version(), input, output, rule);
        self.fixes.push(fix);
        Ok(())
    }

    pub fn build(self) -> Result<FixPipeline, PipelineError> {
        FixPipeline::build(&self.registry, self.fixes)
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineBuilder;
    use crate::PipelineError;
    use docfix_rewrite::Rule;
    use docfix_schema::{DataVersion, ReferenceRegistry, Shape, Type};

    #[test]
    fn fix_before_second_schema_is_rejected() {
        let mut registry = ReferenceRegistry::new();
        let player = registry.register("player", Shape::Record).unwrap();
        let mut builder = PipelineBuilder::new(registry);
        assert!(matches!(
            builder.add_fix("early", Rule::Nop),
            Err(PipelineError::NoParentSchema { .. })
        ));
        builder
            .add_schema(1u32, |s| s.register(&player, Type::Opaque))
            .unwrap();
        assert!(builder.add_fix("still-early", Rule::Nop).is_err());
        builder.add_schema_same(2u32).unwrap();
        builder.add_fix("ok", Rule::Nop).unwrap();
        let pipeline = builder.build().unwrap();
        assert_eq!(pipeline.fixes()[0].input().version(), DataVersion::from(1u32));
    }

    #[test]
    fn schema_errors_surface() {
        let registry = ReferenceRegistry::new();
        let mut builder = PipelineBuilder::new(registry);
        builder.add_schema_same(5u32).unwrap();
        assert!(matches!(
            builder.add_schema_same(5u32),
            Err(PipelineError::Schema(_))
        ));
    }
}
