use crate::{SchemaError, SchemaResult};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// How documents of a category are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A plain map with no type-id.
    Record,
    /// A tagged union: the map field `key` holds the type-id.
    Keyed { key: Arc<str> },
}

impl Shape {
    pub fn keyed(key: &str) -> Shape {
        Shape::Keyed {
            key: Arc::from(key),
        }
    }

    pub fn tag_key(&self) -> Option<&str> {
        match self {
            Shape::Record => None,
            Shape::Keyed { key } => Some(key),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Record => f.write_str("record"),
            Shape::Keyed { key } => write!(f, "keyed by `{key}`"),
        }
    }
}

struct Inner {
    name: Arc<str>,
    shape: Shape,
}

/// Interned handle for a document category. Cheap to clone; compared by name.
#[derive(Clone)]
pub struct Reference(Arc<Inner>);

impl Reference {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn shape(&self) -> &Shape {
        &self.0.shape
    }

    pub fn tag_key(&self) -> Option<&str> {
        self.0.shape.tag_key()
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.name.cmp(&other.0.name)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.0.name)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// The enumerated set of document categories a pipeline knows about.
///
/// Built once at startup and then shared read-only; there is no global instance.
#[derive(Debug, Default, Clone)]
pub struct ReferenceRegistry {
    refs: BTreeMap<Arc<str>, Reference>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`. Registering the same name and shape again returns the existing
    /// handle.
    pub fn register(&mut self, name: &str, shape: Shape) -> SchemaResult<Reference> {
        if let Some(existing) = self.refs.get(name) {
            if *existing.shape() == shape {
                return Ok(existing.clone());
            }
            return Err(SchemaError::DuplicateReference {
                name: name.to_string(),
                existing: existing.shape().clone(),
                requested: shape,
            });
        }
        let name: Arc<str> = Arc::from(name);
        let reference = Reference(Arc::new(Inner {
            name: name.clone(),
            shape,
        }));
        self.refs.insert(name, reference.clone());
        Ok(reference)
    }

    pub fn get(&self, name: &str) -> Option<&Reference> {
        self.refs.get(name)
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.refs.contains_key(reference.name())
    }

    /// References in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.refs.values()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
