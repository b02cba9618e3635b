use indexmap::IndexMap;
use pulse_core::ServiceField;

use crate::units::{UNIT_CELSIUS, UNIT_KELVIN, UNIT_PERCENT};

/// One typing row: matches any of `services` × any of `fields` in `domain`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTyping {
    pub domain: String,
    pub services: Vec<String>,
    pub fields: Vec<String>,
    pub field_type: String,
    pub unit: Option<String>,
}

impl FieldTyping {
    pub fn new(domain: &str, services: &[&str], fields: &[&str], field_type: &str) -> Self {
        Self {
            domain: domain.to_string(),
            services: services.iter().map(|s| s.to_string()).collect(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            field_type: field_type.to_string(),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    fn matches(&self, domain: &str, service: &str, field: &str) -> bool {
        self.domain == domain
            && self.services.iter().any(|s| s == service)
            && self.fields.iter().any(|f| f == field)
    }
}

/// Service-field typing table keyed by `(domain, service, field)`.
///
/// Typing only fills `type`/`unit` where they are missing or blank; values
/// already present are never replaced. The first matching row applies.
#[derive(Debug, Clone, Default)]
pub struct ServiceTyping {
    rows: Vec<FieldTyping>,
}

impl ServiceTyping {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, row: FieldTyping) -> Self {
        self.rows.push(row);
        self
    }

    pub fn lookup(&self, domain: &str, service: &str, field: &str) -> Option<&FieldTyping> {
        self.rows.iter().find(|row| row.matches(domain, service, field))
    }

    /// Type every field of one service. Unmatched fields pass through.
    pub fn apply(
        &self,
        domain: &str,
        service: &str,
        fields: IndexMap<String, ServiceField>,
    ) -> IndexMap<String, ServiceField> {
        fields
            .into_iter()
            .map(|(name, mut field)| {
                if let Some(row) = self.lookup(domain, service, &name) {
                    fill_if_blank(&mut field.field_type, Some(&row.field_type));
                    fill_if_blank(&mut field.unit, row.unit.as_deref());
                }
                (name, field)
            })
            .collect()
    }

    pub fn standard() -> Self {
        Self::empty()
            // climate
            .with_row(
                FieldTyping::new("climate", &["set_temperature"], &["temperature"], "number")
                    .with_unit(UNIT_CELSIUS),
            )
            .with_row(FieldTyping::new("climate", &["set_hvac_mode"], &["hvac_mode"], "enum"))
            .with_row(FieldTyping::new("climate", &["set_preset_mode"], &["preset_mode"], "enum"))
            // light
            .with_row(
                FieldTyping::new("light", &["turn_on"], &["brightness_pct"], "percent")
                    .with_unit(UNIT_PERCENT),
            )
            .with_row(
                FieldTyping::new("light", &["turn_on"], &["color_temp"], "mireds").with_unit("mired"),
            )
            .with_row(
                FieldTyping::new("light", &["turn_on"], &["color_temp_kelvin", "kelvin"], "number")
                    .with_unit(UNIT_KELVIN),
            )
            .with_row(
                FieldTyping::new("light", &["turn_on"], &["transition"], "duration_s").with_unit("s"),
            )
            .with_row(FieldTyping::new("light", &["turn_on"], &["effect"], "enum"))
            // fan
            .with_row(
                FieldTyping::new("fan", &["set_percentage", "set_speed"], &["percentage"], "percent")
                    .with_unit(UNIT_PERCENT),
            )
            .with_row(FieldTyping::new("fan", &["set_direction"], &["direction"], "enum"))
            .with_row(FieldTyping::new(
                "fan",
                &["set_preset_mode", "set_preset"],
                &["preset_mode"],
                "enum",
            ))
            // cover
            .with_row(
                FieldTyping::new("cover", &["set_cover_position"], &["position"], "percent")
                    .with_unit(UNIT_PERCENT),
            )
            .with_row(
                FieldTyping::new("cover", &["set_cover_tilt_position"], &["tilt_position"], "percent")
                    .with_unit(UNIT_PERCENT),
            )
            // media_player
            .with_row(
                FieldTyping::new("media_player", &["volume_set"], &["volume_level"], "percent")
                    .with_unit(UNIT_PERCENT),
            )
            .with_row(FieldTyping::new("media_player", &["select_source"], &["source"], "enum"))
            .with_row(FieldTyping::new(
                "media_player",
                &["select_sound_mode"],
                &["sound_mode"],
                "enum",
            ))
            // number
            .with_row(FieldTyping::new("number", &["set_value"], &["value"], "number"))
    }
}

fn fill_if_blank(slot: &mut Option<String>, candidate: Option<&str>) {
    let blank = slot.as_deref().map_or(true, |s| s.trim().is_empty());
    if let (true, Some(candidate)) = (blank, candidate) {
        *slot = Some(candidate.to_string());
    }
}
