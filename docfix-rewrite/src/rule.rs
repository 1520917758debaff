use crate::{FixResult, Record, TypedValue};
use docfix_schema::Reference;
use docfix_value::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Whole-value conversion. `Ok(None)` means "no match, leave the node alone".
pub type ConvertFn = Arc<dyn Fn(&Value) -> FixResult<Option<Value>> + Send + Sync>;
/// Rewrite of one record, split into declared fields and remainder.
pub type RecordFn = Arc<dyn Fn(Record) -> FixResult<Record> + Send + Sync>;
/// Rewrite of every typed value of a reference.
pub type TypedFn = Arc<dyn Fn(TypedValue) -> FixResult<TypedValue> + Send + Sync>;

/// What a fix does to a document.
#[derive(Clone)]
pub enum Rule {
    /// Schema-only change; the data is already valid under the output schema.
    Nop,
    /// Raw conversion of every node of `reference`.
    Convert { reference: Reference, f: ConvertFn },
    /// Targeted rewrite of the `type_id` variant of `reference`.
    Named {
        reference: Reference,
        type_id: Arc<str>,
        f: RecordFn,
    },
    /// User function over every typed node of `reference`.
    Everywhere { reference: Reference, f: TypedFn },
    /// Rules applied one after another over the whole document.
    Seq(Arc<[Rule]>),
}

impl Rule {
    pub fn convert(
        reference: &Reference,
        f: impl Fn(&Value) -> FixResult<Option<Value>> + Send + Sync + 'static,
    ) -> Rule {
        Rule::Convert {
            reference: reference.clone(),
            f: Arc::new(f),
        }
    }

    pub fn named(
        reference: &Reference,
        type_id: &str,
        f: impl Fn(Record) -> FixResult<Record> + Send + Sync + 'static,
    ) -> Rule {
        Rule::Named {
            reference: reference.clone(),
            type_id: Arc::from(type_id),
            f: Arc::new(f),
        }
    }

    pub fn everywhere(
        reference: &Reference,
        f: impl Fn(TypedValue) -> FixResult<TypedValue> + Send + Sync + 'static,
    ) -> Rule {
        Rule::Everywhere {
            reference: reference.clone(),
            f: Arc::new(f),
        }
    }

    /// Composes rules in order. Nested sequences are flattened and no-ops dropped.
    pub fn seq(rules: impl IntoIterator<Item = Rule>) -> Rule {
        let mut flat = Vec::new();
        for rule in rules {
            match rule {
                Rule::Nop => {}
                Rule::Seq(inner) => flat.extend(inner.iter().cloned()),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Rule::Nop,
            1 => flat.pop().unwrap_or(Rule::Nop),
            _ => Rule::Seq(flat.into()),
        }
    }

    pub fn then(self, next: Rule) -> Rule {
        Rule::seq([self, next])
    }

    pub fn is_nop(&self) -> bool {
        matches!(self, Rule::Nop)
    }

    /// The reference a single rule acts on. `None` for `Nop` and `Seq`.
    pub fn target(&self) -> Option<&Reference> {
        match self {
            Rule::Convert { reference, .. }
            | Rule::Named { reference, .. }
            | Rule::Everywhere { reference, .. } => Some(reference),
            Rule::Nop | Rule::Seq(_) => None,
        }
    }

    /// Every reference this rule may touch.
    pub fn targets(&self) -> BTreeSet<Reference> {
        let mut out = BTreeSet::new();
        self.collect_targets(&mut out);
        out
    }

    fn collect_targets(&self, out: &mut BTreeSet<Reference>) {
        match self {
            Rule::Seq(rules) => rules.iter().for_each(|r| r.collect_targets(out)),
            other => out.extend(other.target().cloned()),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Nop => f.write_str("Nop"),
            Rule::Convert { reference, .. } => write!(f, "Convert({reference})"),
            Rule::Named {
                reference, type_id, ..
            } => write!(f, "Named({reference}/{type_id})"),
            Rule::Everywhere { reference, .. } => write!(f, "Everywhere({reference})"),
            Rule::Seq(rules) => f.debug_list().entries(rules.iter()).finish(),
        }
    }
}
