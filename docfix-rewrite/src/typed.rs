use crate::FixResult;
use docfix_schema::{FieldSpec, Reference, Schema};
use docfix_value::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A value together with the schema type it is asserted to conform to.
#[derive(Clone)]
pub struct TypedValue {
    value: Value,
    schema: Arc<Schema>,
    reference: Reference,
    type_id: Option<Arc<str>>,
}

/// One record split along its field spec.
///
/// `fields` holds the declared keys present in the data, `remainder` every other key except
/// the tag. Both keep the original key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_id: Option<Arc<str>>,
    pub fields: Map,
    pub remainder: Map,
    /// `(old, new)` pairs in the order [`Record::rename`] saw them.
    renames: Vec<(Arc<str>, Arc<str>)>,
}

impl Record {
    pub fn type_id(&self) -> Option<&str> {
        self.type_id.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).or_else(|| self.remainder.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Writes `key` where it currently lives. New keys go to the remainder.
    pub fn set(mut self, key: &str, value: Value) -> Record {
        if self.fields.contains_key(key) {
            self.fields.insert(key, value);
        } else {
            self.remainder.insert(key, value);
        }
        self
    }

    pub fn remove(mut self, key: &str) -> Record {
        self.fields.remove(key);
        self.remainder.remove(key);
        self
    }

    /// Renames `old` to `new`. Once spliced, `new` takes the slot `old` had.
    pub fn rename(mut self, old: &str, new: &str) -> Record {
        if old != new && self.contains(old) {
            self.renames.push((Arc::from(old), Arc::from(new)));
        }
        self.fields = self.fields.renamed(old, new);
        self.remainder = self.remainder.renamed(old, new);
        self
    }

    pub fn retag(mut self, type_id: &str) -> Record {
        self.type_id = Some(Arc::from(type_id));
        self
    }

    /// Current name of the key originally called `original`, if it was renamed.
    fn renamed_to<'a>(&'a self, original: &'a str) -> Option<&'a str> {
        let mut name = original;
        for (old, new) in &self.renames {
            if old.as_ref() == name {
                name = new.as_ref();
            }
        }
        (name != original).then_some(name)
    }
}

impl TypedValue {
    /// Types `value` as a document of `reference`. The type-id is read from the reference's
    /// tag field and normalized by the choice's namespace.
    pub fn new(schema: &Arc<Schema>, reference: &Reference, value: Value) -> TypedValue {
        let type_id = read_type_id(schema, reference, &value);
        TypedValue {
            value,
            schema: schema.clone(),
            reference: reference.clone(),
            type_id,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn type_id(&self) -> Option<&str> {
        self.type_id.as_deref()
    }

    /// Same reference and, when given, same (normalized) type-id.
    pub fn matches(&self, reference: &Reference, type_id: Option<&str>) -> bool {
        &self.reference == reference && type_id.is_none_or(|id| self.is(id))
    }

    pub fn is(&self, type_id: &str) -> bool {
        let wanted = match self.schema.choice(&self.reference) {
            Some(choice) => choice.normalize(type_id).into_owned(),
            None => type_id.to_string(),
        };
        self.type_id.as_deref() == Some(wanted.as_str())
    }

    /// Field spec for this value under its schema. Unknown ids give the opaque spec.
    pub fn field_spec(&self) -> FieldSpec {
        self.schema
            .resolve(&self.reference, self.type_id())
            .unwrap_or_default()
    }

    pub fn split(&self) -> Record {
        let spec = self.field_spec();
        let tag = self.reference.tag_key();
        let mut fields = Map::new();
        let mut remainder = Map::new();
        if let Some(map) = self.value.as_map() {
            for (k, v) in map.iter() {
                if Some(k) == tag {
                    continue;
                }
                if spec.contains(k) {
                    fields.insert(k, v.clone());
                } else {
                    remainder.insert(k, v.clone());
                }
            }
        }
        Record {
            type_id: self.type_id.clone(),
            fields,
            remainder,
            renames: Vec::new(),
        }
    }

    /// Puts an edited record back together.
    ///
    /// Keys keep their original position and a renamed key takes the slot of the key it
    /// replaced. Keys the record dropped disappear; keys it added are appended, declared
    /// fields first, then remainder. An unchanged type-id keeps the
    /// tag exactly as it was written.
    pub fn splice(&self, record: Record) -> TypedValue {
        let original = self.value.as_map().cloned().unwrap_or_default();
        let tag = self.reference.tag_key();
        let retagged = record.type_id != self.type_id;
        let mut out = Map::new();

        for (k, v) in original.iter() {
            if Some(k) == tag {
                match &record.type_id {
                    Some(id) if retagged => out.insert(k, Value::String(id.clone())),
                    _ => out.insert(k, v.clone()),
                }
            } else if let Some(nv) = record.get(k) {
                out.insert(k, nv.clone());
            } else if let Some(new) = record.renamed_to(k)
                && !original.contains_key(new)
                && let Some(nv) = record.get(new)
            {
                out.insert(new, nv.clone());
            }
        }
        if let (Some(tag), Some(id)) = (tag, &record.type_id)
            && retagged
            && !original.contains_key(tag)
        {
            out.insert(tag, Value::String(id.clone()));
        }
        for (k, v) in record.fields.iter().chain(record.remainder.iter()) {
            if Some(k) != tag && !original.contains_key(k) && !out.contains_key(k) {
                out.insert(k, v.clone());
            }
        }

        TypedValue {
            value: Value::Map(out),
            schema: self.schema.clone(),
            reference: self.reference.clone(),
            type_id: record.type_id,
        }
    }

    /// Applies `f` to the remainder, leaving declared fields and the tag alone.
    pub fn update_remainder(&self, f: impl FnOnce(Map) -> FixResult<Map>) -> FixResult<TypedValue> {
        let mut record = self.split();
        record.remainder = f(record.remainder)?;
        Ok(self.splice(record))
    }

    /// Applies `f` to the record only if this value has `type_id`.
    pub fn update_named_choice(
        &self,
        type_id: &str,
        f: impl FnOnce(Record) -> FixResult<Record>,
    ) -> FixResult<TypedValue> {
        if !self.is(type_id) {
            return Ok(self.clone());
        }
        let record = f(self.split())?;
        Ok(self.splice(record))
    }

    /// Writes a new type-id into the tag field, keeping its position.
    pub fn retag(&self, type_id: &str) -> TypedValue {
        let Some(tag) = self.reference.tag_key() else {
            return self.clone();
        };
        self.with_value(self.value.set(tag, Value::from(type_id)))
    }

    /// Replaces the underlying value and re-reads its type-id.
    pub fn with_value(&self, value: Value) -> TypedValue {
        TypedValue::new(&self.schema, &self.reference, value)
    }

    /// Replaces the underlying value through `f`.
    pub fn map_value(&self, f: impl FnOnce(&Value) -> Value) -> TypedValue {
        self.with_value(f(&self.value))
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValue")
            .field("reference", &self.reference)
            .field("type_id", &self.type_id)
            .field("schema", &self.schema.version())
            .field("value", &self.value)
            .finish()
    }
}

fn read_type_id(schema: &Schema, reference: &Reference, value: &Value) -> Option<Arc<str>> {
    let raw = value.field(reference.tag_key()?)?.as_str()?;
    Some(match schema.choice(reference) {
        Some(choice) => Arc::from(choice.normalize(raw).as_ref()),
        None => Arc::from(raw),
    })
}
