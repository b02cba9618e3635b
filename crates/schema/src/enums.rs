use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;

use crate::naming::{enum_value_name, pascal_case};

/// One generated proto enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumType {
    /// `domain.attribute` key the enum was built from.
    pub key: String,
    /// `ClimateHvacMode`
    pub name: String,
    /// `CLIMATEHVACMODE_UNSPECIFIED`, numbered 0.
    pub unspecified: String,
    pub values: Vec<EnumValue>,
}

/// How enum value identifiers are spelled.
///
/// proto3 scopes enum values at package level, so bare names such as
/// `AUTO` collide when two enums in one package share a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueNaming {
    /// `AUTO`
    #[default]
    Bare,
    /// `CLIMATEHVACMODE_AUTO`
    Prefixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub number: u32,
}

/// Group aggregated lock enums by domain.
///
/// Values are numbered from 1 in the order the lock lists them. Values that
/// collapse to an already used identifier are dropped. Keys without a
/// `domain.attribute` shape are skipped.
pub fn enum_types(
    attr_enums: &BTreeMap<String, Vec<String>>,
    naming: ValueNaming,
) -> BTreeMap<String, Vec<EnumType>> {
    let mut by_domain: BTreeMap<String, Vec<EnumType>> = BTreeMap::new();

    for (key, values) in attr_enums {
        let Some((domain, attr)) = key.split_once('.').filter(|(d, a)| !d.is_empty() && !a.is_empty())
        else {
            warn!(key = %key, "Skipping enum key without domain.attribute shape");
            continue;
        };

        let name = format!("{}{}", pascal_case(domain), pascal_case(attr));
        let prefix = name.to_uppercase();
        let mut seen = BTreeSet::new();
        let values: Vec<EnumValue> = values
            .iter()
            .map(|v| match naming {
                ValueNaming::Bare => enum_value_name(v),
                ValueNaming::Prefixed => format!("{prefix}_{}", enum_value_name(v)),
            })
            .filter(|n| seen.insert(n.clone()))
            .zip(1u32..)
            .map(|(name, number)| EnumValue { name, number })
            .collect();

        by_domain.entry(domain.to_string()).or_default().push(EnumType {
            key: key.clone(),
            unspecified: format!("{prefix}_UNSPECIFIED"),
            name,
            values,
        });
    }
    by_domain
}
