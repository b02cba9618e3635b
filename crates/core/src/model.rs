use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Schema version stamped on every manifest.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Schema version stamped on every lock file.
pub const LOCK_SCHEMA_VERSION: u32 = 1;

/// Shape of an inferred attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeKind {
    Enum,
    Number,
    Boolean,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeKind::Enum => write!(f, "ENUM"),
            AttributeKind::Number => write!(f, "NUMBER"),
            AttributeKind::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// Numeric bounds an attribute accepts. Any bound may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl CapabilityRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            step: Some(step),
        }
    }
}

/// Inferred type, unit and bounds of one entity attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub kind: AttributeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_range: Option<CapabilityRange>,
}

impl AttributeDescriptor {
    fn of(kind: AttributeKind) -> Self {
        Self {
            kind,
            unit: None,
            enum_values: Vec::new(),
            optional: false,
            capability_range: None,
        }
    }

    /// ENUM descriptor with values in the order given.
    pub fn enumeration(values: Vec<String>) -> Self {
        Self {
            enum_values: values,
            ..Self::of(AttributeKind::Enum)
        }
    }

    pub fn number() -> Self {
        Self::of(AttributeKind::Number)
    }

    pub fn boolean() -> Self {
        Self::of(AttributeKind::Boolean)
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_range(mut self, range: CapabilityRange) -> Self {
        self.capability_range = Some(range);
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

/// One discovered device/capability endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Persistent identity; assigned by the lock, never by inference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
    /// Natural key, `<domain>.<name>`.
    pub entity_id: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, AttributeDescriptor>,
}

impl Entity {
    pub fn new(entity_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            stable_id: None,
            entity_id: entity_id.into(),
            domain: domain.into(),
            device_class: None,
            area: None,
            attributes: IndexMap::new(),
        }
    }

    /// The stable id if present and not blank.
    pub fn stable_id(&self) -> Option<&str> {
        self.stable_id.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Typed parameter of a callable service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceField {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl ServiceField {
    pub fn new(field_type: Option<&str>, unit: Option<&str>, required: Option<bool>) -> Self {
        Self {
            field_type: field_type.map(str::to_string),
            unit: unit.map(str::to_string),
            required,
        }
    }

    pub fn is_required(&self) -> bool {
        self.required == Some(true)
    }
}

/// A callable service and its parameter table. Natural key is `(domain, service)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub domain: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, ServiceField>,
}

impl Service {
    pub fn new(domain: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            fields: IndexMap::new(),
        }
    }

    /// Lock key: `domain.service`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }
}

/// The typed schema snapshot of all entities and services for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub source_version: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Manifest {
    pub fn new(source_version: impl Into<String>) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            source_version: source_version.into(),
            entities: Vec::new(),
            services: Vec::new(),
        }
    }
}

/// Persisted record of manifest hash, stable identities, service
/// signatures and aggregated enum values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockFile {
    pub schema_version: u32,
    /// SHA-256 hex of the canonical manifest.
    pub manifest_hash: String,
    /// UTC ISO-8601 instant.
    pub generated_at: String,
    /// entity id → stable id.
    #[serde(default)]
    pub entity_map: BTreeMap<String, String>,
    /// `domain.service` → SHA-256 hex signature.
    #[serde(default)]
    pub service_sig: BTreeMap<String, String>,
    /// `domain.attribute` → sorted unique enum values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attr_enums: BTreeMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_json_omits_absent_parts() {
        let d = AttributeDescriptor::number().with_unit("%");
        let json = serde_json::to_string(&d).expect("serialize");
        assert_eq!(json, r#"{"kind":"NUMBER","unit":"%"}"#);
    }

    #[test]
    fn service_field_uses_type_key() {
        let f = ServiceField::new(Some("number"), Some("°C"), Some(true));
        let json = serde_json::to_string(&f).expect("serialize");
        assert_eq!(json, r#"{"type":"number","unit":"°C","required":true}"#);
        let back: ServiceField = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, f);
        assert!(back.is_required());
    }

    #[test]
    fn blank_stable_id_counts_as_absent() {
        let mut e = Entity::new("light.kitchen", "light");
        e.stable_id = Some("  ".to_string());
        assert_eq!(e.stable_id(), None);
        e.stable_id = Some("stable:abc".to_string());
        assert_eq!(e.stable_id(), Some("stable:abc"));
    }

    #[test]
    fn service_key_joins_domain_and_name() {
        assert_eq!(Service::new("climate", "set_temperature").key(), "climate.set_temperature");
    }
}
