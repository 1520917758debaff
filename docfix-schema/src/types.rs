use crate::Reference;
use im::OrdMap;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Shape assigned to a value by a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Anything. Carried through migrations untouched.
    Opaque,
    /// A nested document of another category.
    Reference(Reference),
    List(Arc<Type>),
    /// A map whose every value has the same type.
    MapOf(Arc<Type>),
    Fields(FieldSpec),
    Choice(ChoiceType),
}

impl Type {
    pub fn list(inner: Type) -> Type {
        Type::List(Arc::new(inner))
    }

    pub fn map_of(inner: Type) -> Type {
        Type::MapOf(Arc::new(inner))
    }

    pub fn reference(reference: &Reference) -> Type {
        Type::Reference(reference.clone())
    }

    /// Adds every reference mentioned anywhere in this type to `out`.
    pub fn collect_references(&self, out: &mut BTreeSet<Reference>) {
        match self {
            Type::Opaque => {}
            Type::Reference(r) => {
                out.insert(r.clone());
            }
            Type::List(inner) | Type::MapOf(inner) => inner.collect_references(out),
            Type::Fields(spec) => spec.collect_references(out),
            Type::Choice(choice) => {
                for spec in choice.variants.values() {
                    spec.collect_references(out);
                }
            }
        }
    }
}

/// Named, typed sub-fields of a record. Every field is optional in the data; keys not
/// listed here form the record's remainder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSpec {
    fields: Arc<Vec<(Arc<str>, Type)>>,
}

impl FieldSpec {
    /// A spec that claims nothing: the whole record is remainder.
    pub fn opaque() -> FieldSpec {
        FieldSpec::default()
    }

    /// Adds or replaces the declaration for `name`.
    pub fn field(mut self, name: &str, ty: Type) -> FieldSpec {
        let fields = Arc::make_mut(&mut self.fields);
        match fields.iter_mut().find(|(n, _)| n.as_ref() == name) {
            Some(slot) => slot.1 = ty,
            None => fields.push((Arc::from(name), ty)),
        }
        self
    }

    pub fn without_field(mut self, name: &str) -> FieldSpec {
        Arc::make_mut(&mut self.fields).retain(|(n, _)| n.as_ref() != name);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, t)| t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declarations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> + '_ {
        self.fields.iter().map(|(n, t)| (n.as_ref(), t))
    }

    pub fn is_opaque(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn collect_references(&self, out: &mut BTreeSet<Reference>) {
        for (_, ty) in self.fields.iter() {
            ty.collect_references(out);
        }
    }
}

/// Tagged union keyed by a string type-id.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceType {
    key: Arc<str>,
    namespace: Option<Arc<str>>,
    variants: OrdMap<Arc<str>, FieldSpec>,
}

impl ChoiceType {
    pub fn new(key: &str) -> ChoiceType {
        ChoiceType {
            key: Arc::from(key),
            namespace: None,
            variants: OrdMap::new(),
        }
    }

    /// Type-ids without a namespace get `namespace:` prepended before lookup.
    pub fn with_namespace(mut self, namespace: &str) -> ChoiceType {
        self.namespace = Some(Arc::from(namespace));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn normalize<'a>(&self, type_id: &'a str) -> Cow<'a, str> {
        match &self.namespace {
            Some(ns) => ensure_namespaced(type_id, ns),
            None => Cow::Borrowed(type_id),
        }
    }

    pub fn variant(&self, type_id: &str) -> Option<&FieldSpec> {
        self.variants.get(self.normalize(type_id).as_ref())
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.variant(type_id).is_some()
    }

    /// Adds or reinterprets a variant.
    pub fn with_variant(&self, type_id: &str, spec: FieldSpec) -> ChoiceType {
        let id: Arc<str> = Arc::from(self.normalize(type_id).as_ref());
        ChoiceType {
            variants: self.variants.update(id, spec),
            ..self.clone()
        }
    }

    pub fn without_variant(&self, type_id: &str) -> ChoiceType {
        ChoiceType {
            variants: self.variants.without(self.normalize(type_id).as_ref()),
            ..self.clone()
        }
    }

    /// Known type-ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.variants.keys().map(|k| k.as_ref())
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Prefixes `id` with `namespace:` unless it already names a namespace.
pub fn ensure_namespaced<'a>(id: &'a str, namespace: &str) -> Cow<'a, str> {
    if id.contains(':') || id.is_empty() {
        Cow::Borrowed(id)
    } else {
        Cow::Owned(format!("{namespace}:{id}"))
    }
}
