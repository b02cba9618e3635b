use pulse_core::{
    AttrValue, EntityState, RawDocument, RawServiceField, ServiceDomain, ServiceSchema,
};

use crate::error::FetchError;
use crate::source::SnapshotSource;

pub const DEMO_VERSION: &str = "demo";

/// Small built-in snapshot: a thermostatic radiator valve, a colour light
/// and the `climate.set_temperature` service.
///
/// Reports `version` when one is set and non-blank, otherwise `demo`.
#[derive(Debug, Clone, Default)]
pub struct DemoSource {
    pub version: Option<String>,
}

impl DemoSource {
    pub fn states() -> Vec<EntityState> {
        let trv = doc([
            ("friendly_name", AttrValue::from("Living Room TRV")),
            ("hvac_modes", vec!["off", "heat", "auto"].into()),
            ("preset_modes", vec!["eco", "comfort"].into()),
            ("min_temp", 5.0.into()),
            ("max_temp", 30.0.into()),
            ("target_temp_step", 0.5.into()),
            ("temperature_unit", "°C".into()),
            ("current_temperature", 20.5.into()),
        ]);
        let light = doc([
            ("friendly_name", AttrValue::from("Desk Lamp")),
            ("supported_color_modes", vec!["color_temp", "hs"].into()),
            ("min_mireds", 153.0.into()),
            ("max_mireds", 500.0.into()),
            ("brightness", 128.0.into()),
            ("effect_list", vec!["none", "colorloop"].into()),
        ]);

        let mut trv_state = EntityState::new("climate.living_room_trv", trv);
        trv_state.state = Some("heat".to_string());
        let mut light_state = EntityState::new("light.desk_lamp", light);
        light_state.state = Some("on".to_string());
        vec![trv_state, light_state]
    }

    pub fn services() -> Vec<ServiceDomain> {
        let mut set_temperature = ServiceSchema {
            name: Some("Set target temperature".to_string()),
            ..ServiceSchema::default()
        };
        set_temperature
            .fields
            .insert("temperature".to_string(), RawServiceField::required(true));

        let mut climate = ServiceDomain {
            domain: "climate".to_string(),
            ..ServiceDomain::default()
        };
        climate
            .services
            .insert("set_temperature".to_string(), set_temperature);
        vec![climate]
    }
}

fn doc<const N: usize>(pairs: [(&str, AttrValue); N]) -> RawDocument {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[async_trait::async_trait]
impl SnapshotSource for DemoSource {
    async fn fetch_states(&self) -> Result<Vec<EntityState>, FetchError> {
        Ok(Self::states())
    }

    async fn fetch_services(&self) -> Result<Vec<ServiceDomain>, FetchError> {
        Ok(Self::services())
    }

    fn source_version(&self) -> String {
        self.version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEMO_VERSION)
            .to_string()
    }
}

/// A source with nothing in it.
#[derive(Debug, Clone, Default)]
pub struct EmptySource {
    pub version: Option<String>,
}

#[async_trait::async_trait]
impl SnapshotSource for EmptySource {
    async fn fetch_states(&self) -> Result<Vec<EntityState>, FetchError> {
        Ok(Vec::new())
    }

    async fn fetch_services(&self) -> Result<Vec<ServiceDomain>, FetchError> {
        Ok(Vec::new())
    }

    fn source_version(&self) -> String {
        pulse_core::version_or_unknown(self.version.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fetch_snapshot;

    #[tokio::test]
    async fn demo_snapshot() {
        let snap = fetch_snapshot(&DemoSource::default()).await.expect("demo");
        assert_eq!(snap.version, "demo");
        assert_eq!(snap.states.len(), 2);
        assert_eq!(snap.states[0].entity_id, "climate.living_room_trv");
        assert!(snap.services[0].services["set_temperature"].fields["temperature"].required);
    }

    #[tokio::test]
    async fn demo_reports_given_version() {
        let source = DemoSource {
            version: Some("2025.8.1".into()),
        };
        assert_eq!(fetch_snapshot(&source).await.expect("demo").version, "2025.8.1");
        let blank = DemoSource {
            version: Some("  ".into()),
        };
        assert_eq!(blank.source_version(), "demo");
    }

    #[tokio::test]
    async fn empty_snapshot() {
        let snap = fetch_snapshot(&EmptySource::default()).await.expect("empty");
        assert_eq!(snap.version, "unknown");
        assert!(snap.states.is_empty());
        assert!(snap.services.is_empty());
    }
}
