use indexmap::IndexMap;

use super::domain::DomainRuleSet;
use super::rule::{
    boolean_flag, color_mode_includes, color_temp_kelvin_from_mireds, enum_from, hue_degrees,
    number_descriptor, number_with_caps_from_keys, number_with_caps_temp_c, percent,
    SUPPORTED_COLOR_MODES,
};
use crate::units::UNIT_CELSIUS;

/// Domain name → rule set. Domains without an entry infer no attributes.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    domains: IndexMap<String, DomainRuleSet>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a rule set, replacing any earlier set for the same domain.
    pub fn register(mut self, set: DomainRuleSet) -> Self {
        self.domains.insert(set.domain().to_string(), set);
        self
    }

    pub fn for_domain(&self, domain: &str) -> Option<&DomainRuleSet> {
        self.domains.get(domain)
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    /// The default rules for the common device domains.
    pub fn standard() -> Self {
        Self::empty()
            .register(climate())
            .register(light())
            .register(fan())
            .register(cover())
            .register(media_player())
            .register(number())
    }
}

fn climate() -> DomainRuleSet {
    DomainRuleSet::new("climate")
        .with_rule(enum_from("hvac_mode", "hvac_modes", Some("hvac_mode"), false))
        .with_rule(enum_from("preset_mode", "preset_modes", None, true))
        .with_rule(number_descriptor("current_temp_c", UNIT_CELSIUS))
        .with_rule(number_with_caps_temp_c(
            "target_temp_c",
            UNIT_CELSIUS,
            "min_temp",
            "max_temp",
            "target_temp_step",
            "temperature_unit",
        ))
}

fn light() -> DomainRuleSet {
    let color_temp_gate = color_mode_includes("color_temp");
    DomainRuleSet::new("light")
        .with_rule(percent("brightness_pct").present_if_any(&["brightness", SUPPORTED_COLOR_MODES]))
        .with_rule(enum_from("effect", "effect_list", None, true))
        .with_rule(
            color_temp_kelvin_from_mireds("color_temp_k", "min_mireds", "max_mireds")
                .present_if(move |doc| color_temp_gate(doc) || doc.contains_key("min_mireds")),
        )
        .with_rule(hue_degrees("hue_deg").present_if(color_mode_includes("hs")))
        .with_rule(percent("saturation_pct").present_if(color_mode_includes("hs")))
}

fn fan() -> DomainRuleSet {
    DomainRuleSet::new("fan")
        .with_rule(percent("speed_pct").present_if_any(&["percentage", "speed_list"]))
        .with_rule(enum_from("preset_mode", "preset_modes", None, true))
        .with_rule(enum_from("direction", "direction_list", Some("direction"), true))
        .with_rule(boolean_flag("oscillating", "oscillating"))
}

fn cover() -> DomainRuleSet {
    DomainRuleSet::new("cover")
        .with_rule(percent("position_pct").present_if_any(&["current_position", "position"]))
        .with_rule(
            percent("tilt_position_pct")
                .present_if_any(&["current_tilt_position", "tilt_position"]),
        )
}

fn media_player() -> DomainRuleSet {
    DomainRuleSet::new("media_player")
        .with_rule(percent("volume_pct").present_if_any(&["volume_level"]))
        .with_rule(enum_from("source", "source_list", Some("source"), true))
        .with_rule(enum_from("sound_mode", "sound_mode_list", Some("sound_mode"), true))
}

fn number() -> DomainRuleSet {
    DomainRuleSet::new("number").with_rule(
        number_with_caps_from_keys("value", "unit_of_measurement", "min", "max", "step")
            .present_if_any(&["unit_of_measurement", "min", "max", "step"]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{AttrValue, AttributeKind, CapabilityRange, RawDocument};

    fn doc(pairs: &[(&str, AttrValue)]) -> RawDocument {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn standard_covers_known_domains() {
        let registry = RuleRegistry::standard();
        let domains: Vec<&str> = registry.domains().collect();
        assert_eq!(
            domains,
            vec!["climate", "light", "fan", "cover", "media_player", "number"]
        );
        assert!(registry.for_domain("sensor").is_none());
    }

    #[test]
    fn climate_trv() {
        let registry = RuleRegistry::standard();
        let d = doc(&[
            ("hvac_modes", vec!["off", "heat", "auto"].into()),
            ("preset_modes", vec!["eco", "comfort"].into()),
            ("min_temp", 5.0.into()),
            ("max_temp", 30.0.into()),
            ("target_temp_step", 0.5.into()),
            ("temperature_unit", "°C".into()),
        ]);
        let attrs = registry
            .for_domain("climate")
            .and_then(|set| set.infer(&d))
            .expect("inferred");
        assert_eq!(attrs["hvac_mode"].enum_values, vec!["off", "heat", "auto"]);
        assert!(attrs["preset_mode"].optional);
        assert_eq!(attrs["current_temp_c"].kind, AttributeKind::Number);
        assert_eq!(
            attrs["target_temp_c"].capability_range,
            Some(CapabilityRange::new(5.0, 30.0, 0.5))
        );
    }

    #[test]
    fn light_color_gates() {
        let light = RuleRegistry::standard();
        let light = light.for_domain("light").expect("light rules");

        let ct_only = doc(&[
            ("supported_color_modes", vec!["color_temp"].into()),
            ("min_mireds", 153.0.into()),
            ("max_mireds", 500.0.into()),
        ]);
        let attrs = light.infer(&ct_only).expect("inferred");
        assert!(attrs.contains_key("brightness_pct"));
        assert!(attrs.contains_key("color_temp_k"));
        assert!(!attrs.contains_key("hue_deg"));
        assert!(!attrs.contains_key("saturation_pct"));

        let hs = doc(&[("supported_color_modes", vec!["hs"].into())]);
        let attrs = light.infer(&hs).expect("inferred");
        assert!(attrs.contains_key("hue_deg"));
        assert!(attrs.contains_key("saturation_pct"));
        assert!(!attrs.contains_key("color_temp_k"));
    }

    #[test]
    fn fan_and_number() {
        let registry = RuleRegistry::standard();
        let fan = registry.for_domain("fan").expect("fan rules");
        let attrs = fan
            .infer(&doc(&[("percentage", 50.0.into()), ("oscillating", false.into())]))
            .expect("inferred");
        assert_eq!(attrs["speed_pct"].unit.as_deref(), Some("%"));
        assert_eq!(attrs["oscillating"].kind, AttributeKind::Boolean);

        let number = registry.for_domain("number").expect("number rules");
        assert!(number.infer(&doc(&[("step", 1.0.into())])).is_none());
        let attrs = number
            .infer(&doc(&[
                ("min", 0.0.into()),
                ("max", 100.0.into()),
                ("unit_of_measurement", "W".into()),
            ]))
            .expect("inferred");
        assert_eq!(attrs["value"].unit.as_deref(), Some("W"));
    }
}
