use std::collections::BTreeMap;

use pulse_core::Manifest;

/// Entity/service totals and coverage counts for a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestStats {
    pub entities: usize,
    pub services: usize,
    /// domain → entity count
    pub domains: BTreeMap<String, usize>,
    /// `domain.attribute` → number of entities carrying it
    pub attributes: BTreeMap<String, usize>,
}

impl ManifestStats {
    pub fn collect(manifest: &Manifest) -> Self {
        let mut stats = Self {
            entities: manifest.entities.len(),
            services: manifest.services.len(),
            ..Self::default()
        };
        for entity in &manifest.entities {
            *stats.domains.entry(entity.domain.clone()).or_default() += 1;
            for attr in entity.attributes.keys() {
                *stats
                    .attributes
                    .entry(format!("{}.{}", entity.domain, attr))
                    .or_default() += 1;
            }
        }
        stats
    }

    pub fn top_domains(&self, n: usize) -> Vec<(&str, usize)> {
        top(&self.domains, n)
    }

    pub fn top_attributes(&self, n: usize) -> Vec<(&str, usize)> {
        top(&self.attributes, n)
    }
}

/// Highest counts first, ties by key.
fn top(counts: &BTreeMap<String, usize>, n: usize) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{AttributeDescriptor, Entity, Service};

    #[test]
    fn counts_and_ranking() {
        let mut m = Manifest::new("test");
        for id in ["light.a", "light.b", "fan.c", "cover.d", "cover.e"] {
            let domain = id.split('.').next().unwrap_or_default();
            let mut e = Entity::new(id, domain);
            if domain == "light" {
                e.attributes.insert("brightness_pct".into(), AttributeDescriptor::number());
            }
            m.entities.push(e);
        }
        m.services.push(Service::new("light", "turn_on"));

        let stats = ManifestStats::collect(&m);
        assert_eq!(stats.entities, 5);
        assert_eq!(stats.services, 1);
        assert_eq!(stats.top_domains(2), vec![("cover", 2), ("light", 2)]);
        assert_eq!(stats.top_domains(10).len(), 3);
        assert_eq!(stats.top_attributes(5), vec![("light.brightness_pct", 2)]);
    }
}
