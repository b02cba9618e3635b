use indexmap::IndexMap;
use pulse_core::{AttributeDescriptor, RawDocument};

use super::rule::AttributeRule;

/// Ordered attribute rules for one entity domain.
#[derive(Debug, Clone)]
pub struct DomainRuleSet {
    domain: String,
    rules: Vec<AttributeRule>,
}

impl DomainRuleSet {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: AttributeRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn rules(&self) -> &[AttributeRule] {
        &self.rules
    }

    /// Run every rule in order. The first rule to emit a name owns it;
    /// later emissions of the same name are dropped. `None` when nothing
    /// was emitted.
    pub fn infer(&self, doc: &RawDocument) -> Option<IndexMap<String, AttributeDescriptor>> {
        let mut out: IndexMap<String, AttributeDescriptor> = IndexMap::new();
        for rule in &self.rules {
            if let Some((name, descriptor)) = rule.infer(doc) {
                out.entry(name).or_insert(descriptor);
            }
        }
        (!out.is_empty()).then_some(out)
    }
}
