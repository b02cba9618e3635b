use indexmap::IndexMap;
use pulse_core::{
    version_or_unknown, AttrValue, Entity, EntityState, Manifest, Service, ServiceDomain,
    ServiceField,
};
use tracing::{debug, info, warn};

use crate::infer::{RuleRegistry, ServiceTyping};

/// Raw attribute copied verbatim into `Entity::device_class`.
const DEVICE_CLASS: &str = "device_class";

/// Turns a raw snapshot into an (uncanonicalized) manifest.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    rules: RuleRegistry,
    typing: ServiceTyping,
}

impl ManifestBuilder {
    pub fn new(rules: RuleRegistry, typing: ServiceTyping) -> Self {
        Self { rules, typing }
    }

    /// Builder over the default rule registry and typing table.
    pub fn standard() -> Self {
        Self::new(RuleRegistry::standard(), ServiceTyping::standard())
    }

    /// Build a manifest in snapshot order. A blank version label becomes
    /// `unknown`. Entities without an id are skipped; everything else is
    /// kept, with whatever attributes could be inferred.
    pub fn build(
        &self,
        source_version: &str,
        states: &[EntityState],
        services: &[ServiceDomain],
    ) -> Manifest {
        let mut manifest = Manifest::new(version_or_unknown(Some(source_version)));

        for state in states {
            if state.entity_id.trim().is_empty() {
                warn!("Skipping entity state without entity_id");
                continue;
            }
            manifest.entities.push(self.entity_from_state(state));
        }

        for domain in services {
            if domain.domain.trim().is_empty() {
                warn!(
                    services = domain.services.len(),
                    "Skipping service domain without a name"
                );
                continue;
            }
            for (name, schema) in &domain.services {
                let fields: IndexMap<String, ServiceField> = schema
                    .fields
                    .iter()
                    .map(|(field, raw)| (field.clone(), ServiceField::new(None, None, Some(raw.required))))
                    .collect();
                let mut service = Service::new(domain.domain.clone(), name.clone());
                service.fields = self.typing.apply(&domain.domain, name, fields);
                manifest.services.push(service);
            }
        }

        info!(
            source_version = %manifest.source_version,
            entities = manifest.entities.len(),
            services = manifest.services.len(),
            "Manifest built"
        );
        manifest
    }

    fn entity_from_state(&self, state: &EntityState) -> Entity {
        let domain = domain_of(&state.entity_id);
        let mut entity = Entity::new(state.entity_id.clone(), domain);
        entity.device_class = state.attr(DEVICE_CLASS).and_then(AttrValue::as_text);

        match self.rules.for_domain(domain) {
            Some(set) => {
                if let Some(attrs) = set.infer(&state.attributes) {
                    entity.attributes = attrs;
                }
            }
            None => debug!(entity_id = %state.entity_id, domain, "No rules for domain"),
        }
        entity
    }
}

/// Prefix of `entity_id` before the first `.`, or the whole id when there
/// is no usable prefix.
pub fn domain_of(entity_id: &str) -> &str {
    match entity_id.find('.') {
        Some(i) if i > 0 => &entity_id[..i],
        _ => entity_id,
    }
}
