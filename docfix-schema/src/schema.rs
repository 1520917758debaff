use crate::{
    ChoiceType, DataVersion, FieldSpec, Reference, SchemaError, SchemaResult, Shape, Type,
};
use im::{OrdMap, OrdSet};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shapes of every known document category at one data version.
#[derive(Debug)]
pub struct Schema {
    version: DataVersion,
    parent: Option<Arc<Schema>>,
    types: OrdMap<Reference, Type>,
    /// For each reference, every reference that can occur somewhere beneath it.
    reach: OrdMap<Reference, OrdSet<Reference>>,
}

impl Schema {
    /// Starts a schema at `version`, inheriting every type of `parent`.
    pub fn build(version: impl Into<DataVersion>, parent: Option<&Arc<Schema>>) -> SchemaBuilder {
        SchemaBuilder {
            version: version.into(),
            parent: parent.cloned(),
            types: parent.map(|p| p.types.clone()).unwrap_or_default(),
            errors: Vec::new(),
        }
    }

    /// A schema at `version` with exactly the types of `parent`.
    pub fn same(version: impl Into<DataVersion>, parent: &Arc<Schema>) -> SchemaResult<Arc<Schema>> {
        Schema::build(version, Some(parent)).build()
    }

    pub fn version(&self) -> DataVersion {
        self.version
    }

    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.types.contains_key(reference)
    }

    pub fn get_type(&self, reference: &Reference) -> Option<&Type> {
        self.types.get(reference)
    }

    /// References this schema declares, in name order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.types.keys()
    }

    pub fn choice(&self, reference: &Reference) -> Option<&ChoiceType> {
        match self.types.get(reference) {
            Some(Type::Choice(choice)) => Some(choice),
            _ => None,
        }
    }

    /// Field spec for one document of `reference` with the given type-id.
    ///
    /// Unknown type-ids (and references whose type is not a record) resolve to the opaque
    /// spec, so the whole document is remainder.
    pub fn resolve(&self, reference: &Reference, type_id: Option<&str>) -> SchemaResult<FieldSpec> {
        let ty = self.types.get(reference).ok_or_else(|| self.unknown(reference))?;
        Ok(match (ty, type_id) {
            (Type::Choice(choice), Some(id)) => choice.variant(id).cloned().unwrap_or_default(),
            (Type::Fields(spec), _) => spec.clone(),
            _ => FieldSpec::opaque(),
        })
    }

    /// Strict variant of [`Schema::resolve`] for fix authors.
    pub fn choice_type(&self, reference: &Reference, type_id: &str) -> SchemaResult<FieldSpec> {
        let ty = self.types.get(reference).ok_or_else(|| self.unknown(reference))?;
        let Type::Choice(choice) = ty else {
            return Err(SchemaError::NotAChoice {
                reference: reference.name().to_string(),
                version: self.version,
            });
        };
        choice
            .variant(type_id)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownTypeId {
                reference: reference.name().to_string(),
                type_id: type_id.to_string(),
                version: self.version,
            })
    }

    /// True if a document of `from` can contain a document of `target`, or is one.
    pub fn can_reach(&self, from: &Reference, target: &Reference) -> bool {
        from == target || self.reach.get(from).is_some_and(|set| set.contains(target))
    }

    /// True if `ty` can contain a document of `target` under this schema.
    pub fn type_can_reach(&self, ty: &Type, target: &Reference) -> bool {
        let mut direct = BTreeSet::new();
        ty.collect_references(&mut direct);
        direct.iter().any(|r| self.can_reach(r, target))
    }

    fn unknown(&self, reference: &Reference) -> SchemaError {
        SchemaError::UnknownReference {
            name: reference.name().to_string(),
            version: self.version,
        }
    }
}

/// Accumulates overrides on top of a parent schema. Problems are reported by
/// [`SchemaBuilder::build`].
#[derive(Debug)]
pub struct SchemaBuilder {
    version: DataVersion,
    parent: Option<Arc<Schema>>,
    types: OrdMap<Reference, Type>,
    errors: Vec<SchemaError>,
}

impl SchemaBuilder {
    /// Declares or reinterprets the type of `reference`.
    pub fn register(mut self, reference: &Reference, ty: Type) -> Self {
        self.types.insert(reference.clone(), ty);
        self
    }

    /// Declares `reference` as a choice type keyed by its shape's tag key. An existing
    /// choice keeps its variants.
    pub fn register_choice(self, reference: &Reference, namespace: Option<&str>) -> Self {
        let Some(key) = reference.tag_key() else {
            return self.fail(SchemaError::ShapeMismatch {
                reference: reference.name().to_string(),
                detail: "record references cannot hold a choice type".to_string(),
            });
        };
        let choice = match self.types.get(reference) {
            Some(Type::Choice(existing)) => existing.clone(),
            _ => ChoiceType::new(key),
        };
        let choice = match namespace {
            Some(ns) => choice.with_namespace(ns),
            None => choice,
        };
        self.register(reference, Type::Choice(choice))
    }

    /// Adds a type-id to a choice, or reinterprets an existing one.
    pub fn add_choice(self, reference: &Reference, type_id: &str, spec: FieldSpec) -> Self {
        self.edit_choice(reference, |choice| choice.with_variant(type_id, spec))
    }

    pub fn remove_choice(self, reference: &Reference, type_id: &str) -> Self {
        self.edit_choice(reference, |choice| choice.without_variant(type_id))
    }

    /// Whether anything was declared or failed beyond the parent's types.
    pub fn has_overrides(&self) -> bool {
        if !self.errors.is_empty() {
            return true;
        }
        match &self.parent {
            Some(parent) => self.types != parent.types,
            None => !self.types.is_empty(),
        }
    }

    pub fn build(self) -> SchemaResult<Arc<Schema>> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        if let Some(parent) = &self.parent
            && parent.version >= self.version
        {
            return Err(SchemaError::VersionNotIncreasing {
                version: self.version,
                parent: parent.version,
            });
        }
        for (reference, ty) in self.types.iter() {
            check_shape(reference, ty)?;
        }
        let reach = compute_reach(&self.types, self.version);
        debug!(version = %self.version, references = self.types.len(), "schema built");
        Ok(Arc::new(Schema {
            version: self.version,
            parent: self.parent,
            types: self.types,
            reach,
        }))
    }

    fn edit_choice(mut self, reference: &Reference, f: impl FnOnce(&ChoiceType) -> ChoiceType) -> Self {
        match self.types.get(reference) {
            Some(Type::Choice(choice)) => {
                let next = f(choice);
                self.types.insert(reference.clone(), Type::Choice(next));
                self
            }
            Some(_) => {
                let version = self.version;
                self.fail(SchemaError::NotAChoice {
                    reference: reference.name().to_string(),
                    version,
                })
            }
            None => {
                let version = self.version;
                self.fail(SchemaError::UnknownReference {
                    name: reference.name().to_string(),
                    version,
                })
            }
        }
    }

    fn fail(mut self, err: SchemaError) -> Self {
        self.errors.push(err);
        self
    }
}

fn check_shape(reference: &Reference, ty: &Type) -> SchemaResult<()> {
    match (reference.shape(), ty) {
        (Shape::Keyed { key }, Type::Choice(choice)) if choice.key() != key.as_ref() => {
            Err(SchemaError::ShapeMismatch {
                reference: reference.name().to_string(),
                detail: format!("choice keyed by `{}`, reference keyed by `{key}`", choice.key()),
            })
        }
        (Shape::Keyed { .. }, Type::Choice(_) | Type::Opaque) => Ok(()),
        (Shape::Keyed { .. }, _) => Err(SchemaError::ShapeMismatch {
            reference: reference.name().to_string(),
            detail: "keyed references must hold a choice type".to_string(),
        }),
        (Shape::Record, Type::Choice(_)) => Err(SchemaError::ShapeMismatch {
            reference: reference.name().to_string(),
            detail: "record references cannot hold a choice type".to_string(),
        }),
        (Shape::Record, _) => Ok(()),
    }
}

/// Transitive closure of "type of A mentions B".
fn compute_reach(
    types: &OrdMap<Reference, Type>,
    version: DataVersion,
) -> OrdMap<Reference, OrdSet<Reference>> {
    let mut reach: Vec<(Reference, BTreeSet<Reference>)> = types
        .iter()
        .map(|(reference, ty)| {
            let mut direct = BTreeSet::new();
            ty.collect_references(&mut direct);
            for dangling in direct.iter().filter(|r| !types.contains_key(*r)) {
                warn!(
                    version = %version,
                    from = %reference,
                    to = %dangling,
                    "type refers to a reference this schema does not declare"
                );
            }
            (reference.clone(), direct)
        })
        .collect();

    loop {
        let mut changed = false;
        for i in 0..reach.len() {
            let extra: BTreeSet<Reference> = reach[i]
                .1
                .iter()
                .filter_map(|r| reach.iter().find(|(k, _)| k == r))
                .flat_map(|(_, set)| set.iter().cloned())
                .filter(|r| !reach[i].1.contains(r))
                .collect();
            if !extra.is_empty() {
                reach[i].1.extend(extra);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    reach
        .into_iter()
        .map(|(reference, set)| (reference, set.into_iter().collect::<OrdSet<_>>()))
        .collect()
}
