//! Attribute and service-field type inference.

pub mod domain;
pub mod registry;
pub mod rule;
pub mod service_typing;

pub use domain::DomainRuleSet;
pub use registry::RuleRegistry;
pub use rule::{AttributeRule, Inferred};
pub use service_typing::{FieldTyping, ServiceTyping};
