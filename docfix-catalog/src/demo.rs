use crate::fixes::{CatalogFix, builtin_fixes};
use docfix_pipeline::{FixPipeline, PipelineBuilder, PipelineError};
use docfix_schema::{
    FieldSpec, Reference, ReferenceRegistry, Schema, SchemaBuilder, SchemaResult, Shape, Type,
};
use tracing::debug;

/// Default namespace of every built-in type-id.
pub const NAMESPACE: &str = "demo";
/// Version of the oldest schema the catalog understands.
pub const BASE_VERSION: u32 = 10;

/// Handles for the document categories of the built-in catalog.
#[derive(Debug, Clone)]
pub struct DemoRefs {
    pub entity: Reference,
    pub block_entity: Reference,
    pub item_stack: Reference,
    pub player: Reference,
    pub random_sequences: Reference,
}

impl DemoRefs {
    pub fn register(registry: &mut ReferenceRegistry) -> SchemaResult<Self> {
        Ok(Self {
            entity: registry.register("entity", Shape::keyed("id"))?,
            block_entity: registry.register("block-entity", Shape::keyed("id"))?,
            item_stack: registry.register("item-stack", Shape::Record)?,
            player: registry.register("player", Shape::Record)?,
            random_sequences: registry.register("saved-data:random-sequences", Shape::Record)?,
        })
    }
}

/// The built-in references and fix pipeline.
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    refs: DemoRefs,
    pipeline: FixPipeline,
}

impl DemoCatalog {
    /// Registers the base schema, then each built-in fix with its schema step.
    pub fn build() -> Result<Self, PipelineError> {
        Self::from_fixes(builtin_fixes())
    }

    pub(crate) fn from_fixes(fixes: Vec<Box<dyn CatalogFix>>) -> Result<Self, PipelineError> {
        let mut registry = ReferenceRegistry::new();
        let refs = DemoRefs::register(&mut registry)?;

        let mut builder = PipelineBuilder::new(registry);
        builder.add_schema(BASE_VERSION, |s| base_schema(&refs, s))?;
        for fix in fixes {
            let meta = fix.meta();
            let existing = builder
                .latest()
                .filter(|s| s.version() == meta.version)
                .cloned();
            match existing {
                Some(latest) => {
                    // The schema at this version exists; this fix may only reuse it.
                    let edit = fix.schema(&refs, Schema::build(meta.version, Some(&latest)));
                    if edit.has_overrides() {
                        return Err(PipelineError::SchemaRedefined {
                            name: meta.name.to_string(),
                            version: meta.version,
                        });
                    }
                }
                None => {
                    builder.add_schema(meta.version, |s| fix.schema(&refs, s))?;
                }
            }
            builder.add_fix(meta.name, fix.rule(&refs))?;
        }
        let pipeline = builder.build()?;
        debug!(
            fixes = pipeline.fixes().len(),
            max_version = ?pipeline.max_version(),
            "demo catalog ready"
        );
        Ok(Self { refs, pipeline })
    }

    pub fn refs(&self) -> &DemoRefs {
        &self.refs
    }

    pub fn pipeline(&self) -> &FixPipeline {
        &self.pipeline
    }

    /// Looks a reference up by its registered name.
    pub fn reference(&self, name: &str) -> Option<&Reference> {
        self.pipeline.registry().get(name)
    }
}

/// Fields shared by every living entity.
pub(crate) fn living(refs: &DemoRefs) -> FieldSpec {
    FieldSpec::opaque()
        .field("HandItems", Type::list(Type::reference(&refs.item_stack)))
        .field("ArmorItems", Type::list(Type::reference(&refs.item_stack)))
        .field("Passengers", Type::list(Type::reference(&refs.entity)))
}

fn base_schema(refs: &DemoRefs, s: SchemaBuilder) -> SchemaBuilder {
    let entity = &refs.entity;
    let block_entity = &refs.block_entity;
    let item = Type::reference(&refs.item_stack);

    s.register(
        &refs.item_stack,
        Type::Fields(FieldSpec::opaque().field(
            "tag",
            Type::Fields(FieldSpec::opaque().field("EntityTag", Type::reference(entity))),
        )),
    )
    .register_choice(entity, Some(NAMESPACE))
    .add_choice(entity, "fish", living(refs).field("type", Type::Opaque))
    .add_choice(entity, "skeleton", living(refs))
    .add_choice(entity, "zombie", living(refs))
    .add_choice(entity, "pig", living(refs))
    .add_choice(entity, "mooshroom", living(refs))
    .add_choice(entity, "arrow", FieldSpec::opaque())
    .add_choice(entity, "area_effect_cloud", FieldSpec::opaque())
    .add_choice(entity, "item", FieldSpec::opaque().field("Item", item.clone()))
    .register_choice(block_entity, Some(NAMESPACE))
    .add_choice(block_entity, "chest", FieldSpec::opaque().field("Items", Type::list(item.clone())))
    .add_choice(block_entity, "beacon", FieldSpec::opaque())
    .add_choice(
        block_entity,
        "mob_spawner",
        FieldSpec::opaque().field("SpawnData", Type::reference(entity)),
    )
    .add_choice(block_entity, "noteblock", FieldSpec::opaque())
    .register(
        &refs.player,
        Type::Fields(
            FieldSpec::opaque()
                .field("Inventory", Type::list(item.clone()))
                .field("EnderItems", Type::list(item))
                .field(
                    "RootVehicle",
                    Type::Fields(FieldSpec::opaque().field("Entity", Type::reference(entity))),
                ),
        ),
    )
    .register(&refs.random_sequences, Type::Opaque)
}
