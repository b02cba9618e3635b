//! Deterministic ordering for manifests.
//!
//! Hashes are only ever taken over canonical manifests, so both sides of any
//! hash comparison must pass through [`canonicalize`].

use std::cmp::Ordering;

use pulse_core::{Entity, Manifest, Service};

/// Sort entities by stable id (absent last, entity id breaking ties),
/// services by `(domain, service)`, and every attribute/field map by key.
/// Idempotent.
pub fn canonicalize(manifest: &Manifest) -> Manifest {
    let mut out = manifest.clone();

    for entity in &mut out.entities {
        entity.attributes.sort_keys();
    }
    for service in &mut out.services {
        service.fields.sort_keys();
    }

    out.entities.sort_by(compare_entities);
    out.services.sort_by(compare_services);
    out
}

fn compare_entities(a: &Entity, b: &Entity) -> Ordering {
    let by_stable_id = match (a.stable_id(), b.stable_id()) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_stable_id.then_with(|| a.entity_id.cmp(&b.entity_id))
}

fn compare_services(a: &Service, b: &Service) -> Ordering {
    a.domain
        .cmp(&b.domain)
        .then_with(|| a.service.cmp(&b.service))
}
