//! Lock building: stable identities, service signatures and enum aggregation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};
use pulse_core::{LockFile, Manifest, Service, LOCK_SCHEMA_VERSION};
use tracing::info;

use crate::canon::canonicalize;
use crate::error::ManifestError;
use crate::hashing::{manifest_hash, sha256_hex};
use crate::stable_id;

pub struct LockBuilder;

impl LockBuilder {
    /// Build the lock for `manifest`.
    ///
    /// Stable ids resolve in order: the entity's own non-blank id, the
    /// non-blank id `previous` recorded for the same entity id, then a
    /// derived id.
    /// `previous` is only read.
    pub fn build(
        manifest: &Manifest,
        previous: Option<&LockFile>,
        now: DateTime<Utc>,
    ) -> Result<LockFile, ManifestError> {
        let canonical = canonicalize(manifest);
        let manifest_hash = manifest_hash(&canonical)?;

        let mut entity_map = BTreeMap::new();
        let (mut own, mut reused, mut derived) = (0usize, 0usize, 0usize);
        for entity in &canonical.entities {
            let stable_id = if let Some(id) = entity.stable_id() {
                own += 1;
                id.to_string()
            } else if let Some(id) = previous
                .and_then(|lock| lock.entity_map.get(&entity.entity_id))
                .filter(|id| !id.trim().is_empty())
            {
                reused += 1;
                id.clone()
            } else {
                derived += 1;
                stable_id::derive(&entity.entity_id)
            };
            entity_map.insert(entity.entity_id.clone(), stable_id);
        }

        let service_sig: BTreeMap<String, String> = canonical
            .services
            .iter()
            .map(|svc| (svc.key(), signature_hash(svc)))
            .collect();

        let mut enums: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for entity in &canonical.entities {
            for (attr, descriptor) in &entity.attributes {
                if descriptor.enum_values.is_empty() {
                    continue;
                }
                enums
                    .entry(format!("{}.{}", entity.domain, attr))
                    .or_default()
                    .extend(descriptor.enum_values.iter().cloned());
            }
        }
        let attr_enums: BTreeMap<String, Vec<String>> = enums
            .into_iter()
            .map(|(key, values)| (key, values.into_iter().collect()))
            .collect();

        info!(
            entities = entity_map.len(),
            own,
            reused,
            derived,
            services = service_sig.len(),
            enums = attr_enums.len(),
            "Lock built"
        );

        Ok(LockFile {
            schema_version: LOCK_SCHEMA_VERSION,
            manifest_hash,
            generated_at: now.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            entity_map,
            service_sig,
            attr_enums,
        })
    }
}

/// Shape string hashed into a service signature:
/// `domain.service|name:type[:req][:unit],...` with fields sorted by name.
pub fn service_signature(service: &Service) -> String {
    let mut names: Vec<&String> = service.fields.keys().collect();
    names.sort();

    let parts: Vec<String> = names
        .into_iter()
        .map(|name| {
            let field = &service.fields[name];
            let mut part = format!("{}:{}", name, field.field_type.as_deref().unwrap_or(""));
            if field.is_required() {
                part.push_str(":req");
            }
            if let Some(unit) = field.unit.as_deref().filter(|u| !u.trim().is_empty()) {
                part.push(':');
                part.push_str(unit);
            }
            part
        })
        .collect();

    format!("{}|{}", service.key(), parts.join(","))
}

pub fn signature_hash(service: &Service) -> String {
    sha256_hex(service_signature(service).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pulse_core::{AttributeDescriptor, Entity, ServiceField};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 14, 19, 0, 0).unwrap()
    }

    fn enum_entity(entity_id: &str, attr: &str, values: &[&str]) -> Entity {
        let domain = entity_id.split('.').next().unwrap_or_default();
        let mut e = Entity::new(entity_id, domain);
        e.attributes.insert(
            attr.to_string(),
            AttributeDescriptor::enumeration(values.iter().map(|v| v.to_string()).collect()),
        );
        e
    }

    #[test]
    fn signature_shape() {
        let mut svc = Service::new("climate", "set_temperature");
        svc.fields.insert(
            "temperature".into(),
            ServiceField::new(Some("number"), Some("°C"), Some(true)),
        );
        svc.fields.insert("hvac_mode".into(), ServiceField::new(None, Some(" "), Some(false)));
        assert_eq!(
            service_signature(&svc),
            "climate.set_temperature|hvac_mode:,temperature:number:req:°C"
        );
        assert_eq!(signature_hash(&svc).len(), 64);
    }

    #[test]
    fn identity_resolution_order() {
        let mut m = Manifest::new("test");
        let mut own = Entity::new("light.own", "light");
        own.stable_id = Some("stable:custom".into());
        m.entities = vec![own, Entity::new("light.known", "light"), Entity::new("light.new", "light")];

        let mut previous = LockBuilder::build(&Manifest::new("old"), None, now()).expect("lock");
        previous
            .entity_map
            .insert("light.known".into(), "stable:fromlock".into());
        previous
            .entity_map
            .insert("light.own".into(), "stable:ignored".into());
        // a blank entry is not an identity; it gets re-derived
        previous.entity_map.insert("light.new".into(), " ".into());

        let lock = LockBuilder::build(&m, Some(&previous), now()).expect("lock");
        assert_eq!(lock.entity_map["light.own"], "stable:custom");
        assert_eq!(lock.entity_map["light.known"], "stable:fromlock");
        assert_eq!(lock.entity_map["light.new"], stable_id::derive("light.new"));
    }

    #[test]
    fn enums_are_merged_sorted_and_unique() {
        let mut m = Manifest::new("test");
        m.entities = vec![
            enum_entity("climate.a", "hvac_mode", &["heat", "off", "auto"]),
            enum_entity("climate.b", "hvac_mode", &["off", "eco"]),
            enum_entity("fan.c", "direction", &["forward"]),
        ];
        let lock = LockBuilder::build(&m, None, now()).expect("lock");
        assert_eq!(lock.attr_enums["climate.hvac_mode"], vec!["auto", "eco", "heat", "off"]);
        assert_eq!(lock.attr_enums["fan.direction"], vec!["forward"]);
    }

    #[test]
    fn stamps_version_and_instant() {
        let lock = LockBuilder::build(&Manifest::new("test"), None, now()).expect("lock");
        assert_eq!(lock.schema_version, LOCK_SCHEMA_VERSION);
        assert_eq!(lock.generated_at, "2025-08-14T19:00:00Z");
        assert_eq!(lock.manifest_hash.len(), 64);
        assert!(lock.attr_enums.is_empty());
        assert!(lock.entity_map.is_empty());
    }
}
