use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Loosely-typed attribute map as delivered by the upstream system.
pub type RawDocument = IndexMap<String, AttrValue>;

/// A raw attribute value. Upstream data is JSON, so every shape JSON can
/// express is representable; inference decides what it can use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<AttrValue>),
    Map(IndexMap<String, AttrValue>),
}

impl AttrValue {
    /// Numeric view: numbers as-is, text that parses to a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) if n.is_finite() => Some(*n),
            AttrValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Borrow the value if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render scalars as text, returning None for null, lists and maps.
    pub fn as_text(&self) -> Option<String> {
        match self {
            AttrValue::Text(s) => Some(s.clone()),
            AttrValue::Number(n) => Some(n.to_string()),
            AttrValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// List items rendered as text, skipping nulls. Non-lists yield an empty vec.
    pub fn as_string_list(&self) -> Vec<String> {
        match self {
            AttrValue::List(items) => items.iter().filter_map(AttrValue::as_text).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(items: Vec<&str>) -> Self {
        AttrValue::List(items.into_iter().map(AttrValue::from).collect())
    }
}

/// One entity state document (`/api/states` item).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity_id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: RawDocument,
}

impl EntityState {
    pub fn new(entity_id: impl Into<String>, attributes: RawDocument) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: None,
            attributes,
        }
    }

    /// Look up a raw attribute.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// One service-domain document (`/api/services` item): a domain and the
/// field tables of every service it declares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDomain {
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: IndexMap<String, ServiceSchema>,
}

/// Declared parameters of a single callable service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchema {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: IndexMap<String, RawServiceField>,
}

/// A raw service parameter. Only `required` feeds the manifest; the rest
/// is kept so snapshots round-trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawServiceField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<AttrValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<AttrValue>,
}

impl RawServiceField {
    pub fn required(required: bool) -> Self {
        Self {
            required,
            ..Self::default()
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
