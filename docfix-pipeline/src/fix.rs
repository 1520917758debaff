use docfix_rewrite::{FixResult, Rule, apply_rule_between};
use docfix_schema::{DataVersion, Reference, Schema};
use docfix_value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One named, versioned transformation from an input schema to an output schema.
#[derive(Clone)]
pub struct Fix {
    name: Arc<str>,
    version: DataVersion,
    input: Arc<Schema>,
    output: Arc<Schema>,
    rule: Rule,
}

impl Fix {
    pub fn define(
        name: &str,
        version: impl Into<DataVersion>,
        input: &Arc<Schema>,
        output: &Arc<Schema>,
        rule: Rule,
    ) -> Fix {
        Fix {
            name: Arc::from(name),
            version: version.into(),
            input: input.clone(),
            output: output.clone(),
            rule,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> DataVersion {
        self.version
    }

    pub fn input(&self) -> &Arc<Schema> {
        &self.input
    }

    pub fn output(&self) -> &Arc<Schema> {
        &self.output
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Runs the rule over one document, typed under the input schema. Nodes an earlier rule
    /// of this fix retagged to an id only the output schema knows are typed under that.
    pub fn apply(&self, reference: &Reference, document: &Value) -> FixResult<Value> {
        if self.rule.is_nop() {
            return Ok(document.clone());
        }
        let reachable = self
            .rule
            .targets()
            .iter()
            .any(|target| {
                self.input.can_reach(reference, target) || self.output.can_reach(reference, target)
            });
        if !reachable {
            return Ok(document.clone());
        }
        debug!(fix = %self.name, version = %self.version, reference = %reference, "applying fix");
        apply_rule_between(&self.rule, &self.input, &self.output, reference, document)
    }
}

impl fmt::Debug for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fix")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("input", &self.input.version())
            .field("output", &self.output.version())
            .field("rule", &self.rule)
            .finish()
    }
}
