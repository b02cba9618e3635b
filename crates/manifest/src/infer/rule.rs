//! Composable attribute rules.
//!
//! An [`AttributeRule`] is a pure function from a raw attribute document to
//! at most one `(name, descriptor)` pair. Rules are built from a small set
//! of constructors and narrowed with gates:
//! - **Constructors**: [`enum_from`], [`number_with_caps_temp_c`],
//!   [`number_with_fixed_caps`], [`number_with_caps_from_keys`],
//!   [`color_temp_kelvin_from_mireds`], [`boolean_flag`],
//!   [`number_descriptor`], [`percent`], [`hue_degrees`]
//! - **Gates**: [`AttributeRule::present_if_any`],
//!   [`AttributeRule::present_if_all`], [`AttributeRule::present_if`]

use std::fmt;
use std::sync::Arc;

use pulse_core::{AttrValue, AttributeDescriptor, CapabilityRange, RawDocument};

use crate::units::{
    self, COLOR_TEMP_STEP_K, DEFAULT_TEMP_STEP, DEGREE, UNIT_KELVIN, UNIT_PERCENT,
};

/// A named descriptor produced by a rule.
pub type Inferred = (String, AttributeDescriptor);

type InferFn = dyn Fn(&RawDocument) -> Option<Inferred> + Send + Sync;

/// A single attribute inference rule.
#[derive(Clone)]
pub struct AttributeRule {
    name: String,
    infer: Arc<InferFn>,
}

impl AttributeRule {
    pub fn new<F>(name: impl Into<String>, infer: F) -> Self
    where
        F: Fn(&RawDocument) -> Option<Inferred> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            infer: Arc::new(infer),
        }
    }

    /// Name of the attribute this rule emits.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn infer(&self, doc: &RawDocument) -> Option<Inferred> {
        (self.infer)(doc)
    }

    /// Emit only when at least one of `keys` is present.
    pub fn present_if_any(self, keys: &[&str]) -> Self {
        let keys = owned(keys);
        self.present_if(move |doc| keys.iter().any(|k| is_present(doc, k)))
    }

    /// Emit only when every one of `keys` is present.
    pub fn present_if_all(self, keys: &[&str]) -> Self {
        let keys = owned(keys);
        self.present_if(move |doc| keys.iter().all(|k| is_present(doc, k)))
    }

    /// Emit only when `predicate` holds for the document.
    pub fn present_if<P>(self, predicate: P) -> Self
    where
        P: Fn(&RawDocument) -> bool + Send + Sync + 'static,
    {
        let inner = self.infer;
        Self {
            name: self.name,
            infer: Arc::new(move |doc: &RawDocument| {
                if predicate(doc) {
                    inner(doc)
                } else {
                    None
                }
            }),
        }
    }
}

impl fmt::Debug for AttributeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeRule").field("name", &self.name).finish()
    }
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

/// A key counts as present when it exists, whatever its value (`null`
/// included).
fn is_present(doc: &RawDocument, key: &str) -> bool {
    doc.contains_key(key)
}

fn number(doc: &RawDocument, key: &str) -> Option<f64> {
    doc.get(key).and_then(AttrValue::as_f64)
}

fn text(doc: &RawDocument, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(AttrValue::as_text)
        .filter(|s| !s.trim().is_empty())
}

// ── Constructors ────────────────────────────────────────────────────

/// ENUM from a list field, falling back to a single text field wrapped as
/// a one-element list. Values keep their document order.
pub fn enum_from(name: &str, list_key: &str, fallback_key: Option<&str>, optional: bool) -> AttributeRule {
    let attr = name.to_string();
    let list_key = list_key.to_string();
    let fallback_key = fallback_key.map(str::to_string);
    AttributeRule::new(name, move |doc| {
        let values = doc
            .get(&list_key)
            .map(AttrValue::as_string_list)
            .unwrap_or_default();
        let values = if values.is_empty() {
            let single = fallback_key
                .as_deref()
                .and_then(|k| doc.get(k))
                .and_then(AttrValue::as_str)
                .filter(|s| !s.trim().is_empty())?;
            vec![single.to_string()]
        } else {
            values
        };
        Some((
            attr.clone(),
            AttributeDescriptor::enumeration(values).with_optional(optional),
        ))
    })
}

/// Temperature NUMBER normalized to Celsius.
///
/// Bounds are read from the document; a Fahrenheit `unit_attr_key` converts
/// min/max to Celsius and scales the step. Always emits.
pub fn number_with_caps_temp_c(
    name: &str,
    unit: &str,
    min_key: &str,
    max_key: &str,
    step_key: &str,
    unit_attr_key: &str,
) -> AttributeRule {
    let attr = name.to_string();
    let unit = unit.to_string();
    let (min_key, max_key, step_key, unit_attr_key) = (
        min_key.to_string(),
        max_key.to_string(),
        step_key.to_string(),
        unit_attr_key.to_string(),
    );
    AttributeRule::new(name, move |doc| {
        let mut min = number(doc, &min_key);
        let mut max = number(doc, &max_key);
        let mut step = number(doc, &step_key).unwrap_or(DEFAULT_TEMP_STEP);

        let fahrenheit = doc
            .get(&unit_attr_key)
            .and_then(AttrValue::as_str)
            .is_some_and(units::is_fahrenheit);
        if fahrenheit {
            min = min.map(units::fahrenheit_to_celsius);
            max = max.map(units::fahrenheit_to_celsius);
            step = units::fahrenheit_delta_to_celsius(step);
        }

        let range = CapabilityRange {
            min,
            max,
            step: Some(step),
        };
        Some((
            attr.clone(),
            AttributeDescriptor::number()
                .with_unit(unit.clone())
                .with_range(range),
        ))
    })
}

/// NUMBER with constant bounds.
pub fn number_with_fixed_caps(name: &str, unit: &str, min: f64, max: f64, step: f64) -> AttributeRule {
    let descriptor = AttributeDescriptor::number()
        .with_unit(unit)
        .with_range(CapabilityRange::new(min, max, step));
    let attr = name.to_string();
    AttributeRule::new(name, move |_| Some((attr.clone(), descriptor.clone())))
}

/// Generic NUMBER read entirely from document fields.
///
/// Requires `min` and at least one of `max` or the unit field. Step
/// defaults to 1.
pub fn number_with_caps_from_keys(
    name: &str,
    unit_key: &str,
    min_key: &str,
    max_key: &str,
    step_key: &str,
) -> AttributeRule {
    let attr = name.to_string();
    let (unit_key, min_key, max_key, step_key) = (
        unit_key.to_string(),
        min_key.to_string(),
        max_key.to_string(),
        step_key.to_string(),
    );
    AttributeRule::new(name, move |doc| {
        let min = number(doc, &min_key)?;
        let max = number(doc, &max_key);
        let unit = text(doc, &unit_key);
        if max.is_none() && unit.is_none() {
            return None;
        }
        let step = number(doc, &step_key).unwrap_or(1.0);

        let mut descriptor = AttributeDescriptor::number().with_range(CapabilityRange {
            min: Some(min),
            max,
            step: Some(step),
        });
        descriptor.unit = unit;
        Some((attr.clone(), descriptor))
    })
}

/// Kelvin color temperature from a mired range.
///
/// Mireds are reciprocal, so the Kelvin minimum comes from the mired
/// maximum and vice versa.
pub fn color_temp_kelvin_from_mireds(name: &str, min_mired_key: &str, max_mired_key: &str) -> AttributeRule {
    let attr = name.to_string();
    let (min_key, max_key) = (min_mired_key.to_string(), max_mired_key.to_string());
    AttributeRule::new(name, move |doc| {
        let min_k = units::mireds_to_kelvin(number(doc, &max_key)?)?;
        let max_k = units::mireds_to_kelvin(number(doc, &min_key)?)?;
        Some((
            attr.clone(),
            AttributeDescriptor::number()
                .with_unit(UNIT_KELVIN)
                .with_range(CapabilityRange::new(min_k, max_k, COLOR_TEMP_STEP_K)),
        ))
    })
    .present_if_all(&[min_mired_key, max_mired_key])
}

/// Optional BOOLEAN whenever `presence_key` is present, whatever its value.
pub fn boolean_flag(name: &str, presence_key: &str) -> AttributeRule {
    let attr = name.to_string();
    AttributeRule::new(name, move |_| {
        Some((attr.clone(), AttributeDescriptor::boolean().with_optional(true)))
    })
    .present_if_any(&[presence_key])
}

/// Unconditional NUMBER with a unit and no bounds.
pub fn number_descriptor(name: &str, unit: &str) -> AttributeRule {
    let descriptor = AttributeDescriptor::number().with_unit(unit);
    let attr = name.to_string();
    AttributeRule::new(name, move |_| Some((attr.clone(), descriptor.clone())))
}

pub fn percent(name: &str) -> AttributeRule {
    number_with_fixed_caps(name, UNIT_PERCENT, 0.0, 100.0, 1.0)
}

pub fn hue_degrees(name: &str) -> AttributeRule {
    number_with_fixed_caps(name, DEGREE, 0.0, 360.0, 1.0)
}

// ── Predicates ──────────────────────────────────────────────────────

pub const SUPPORTED_COLOR_MODES: &str = "supported_color_modes";

/// True when `supported_color_modes` lists `mode` (case-insensitive).
pub fn color_mode_includes(mode: &str) -> impl Fn(&RawDocument) -> bool + Send + Sync + 'static {
    let mode = mode.to_string();
    move |doc| {
        doc.get(SUPPORTED_COLOR_MODES)
            .map(AttrValue::as_string_list)
            .unwrap_or_default()
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pairs: &[(&str, AttrValue)]) -> RawDocument {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn range(inferred: &Inferred) -> CapabilityRange {
        inferred.1.capability_range.expect("range")
    }

    #[test]
    fn enum_keeps_document_order() {
        let rule = enum_from("hvac_mode", "hvac_modes", Some("hvac_mode"), false);
        let d = doc(&[("hvac_modes", vec!["off", "heat", "auto"].into())]);
        let (name, desc) = rule.infer(&d).expect("emitted");
        assert_eq!(name, "hvac_mode");
        assert_eq!(desc.enum_values, vec!["off", "heat", "auto"]);
        assert!(!desc.optional);
    }

    #[test]
    fn enum_falls_back_to_single_text() {
        let rule = enum_from("source", "source_list", Some("source"), true);
        let d = doc(&[("source", "HDMI 1".into())]);
        let (_, desc) = rule.infer(&d).expect("emitted");
        assert_eq!(desc.enum_values, vec!["HDMI 1"]);
        assert!(desc.optional);

        // the fallback only accepts text
        let d = doc(&[("source", 3.0.into())]);
        assert!(rule.infer(&d).is_none());
        assert!(rule.infer(&RawDocument::new()).is_none());
    }

    #[test]
    fn temp_caps_in_celsius() {
        let rule = number_with_caps_temp_c(
            "target_temp_c", "°C", "min_temp", "max_temp", "target_temp_step", "temperature_unit",
        );
        let d = doc(&[
            ("min_temp", 5.0.into()),
            ("max_temp", 30.0.into()),
            ("target_temp_step", 0.5.into()),
            ("temperature_unit", "°C".into()),
        ]);
        let inferred = rule.infer(&d).expect("emitted");
        assert_eq!(inferred.1.unit.as_deref(), Some("°C"));
        assert_eq!(range(&inferred), CapabilityRange::new(5.0, 30.0, 0.5));
    }

    #[test]
    fn temp_caps_convert_fahrenheit() {
        let rule = number_with_caps_temp_c(
            "target_temp_c", "°C", "min_temp", "max_temp", "target_temp_step", "temperature_unit",
        );
        let d = doc(&[
            ("min_temp", 41.0.into()),
            ("max_temp", 86.0.into()),
            ("target_temp_step", 1.0.into()),
            ("temperature_unit", "fahrenheit".into()),
        ]);
        let r = range(&rule.infer(&d).expect("emitted"));
        assert!((r.min.unwrap() - 5.0).abs() < 0.01);
        assert!((r.max.unwrap() - 30.0).abs() < 0.01);
        assert!((r.step.unwrap() - 0.5556).abs() < 0.01);
    }

    #[test]
    fn temp_caps_always_emit_with_default_step() {
        let rule = number_with_caps_temp_c("t", "°C", "min", "max", "step", "unit");
        let r = range(&rule.infer(&RawDocument::new()).expect("emitted"));
        assert_eq!(r.min, None);
        assert_eq!(r.max, None);
        assert_eq!(r.step, Some(0.5));
    }

    #[test]
    fn caps_from_keys_needs_min_and_max_or_unit() {
        let rule = number_with_caps_from_keys("value", "unit_of_measurement", "min", "max", "step");

        assert!(rule.infer(&doc(&[("max", 10.0.into())])).is_none());
        assert!(rule.infer(&doc(&[("min", 0.0.into())])).is_none());

        let (_, desc) = rule
            .infer(&doc(&[("min", 0.0.into()), ("unit_of_measurement", "W".into())]))
            .expect("min + unit");
        assert_eq!(desc.unit.as_deref(), Some("W"));
        let r = desc.capability_range.expect("range");
        assert_eq!((r.min, r.max, r.step), (Some(0.0), None, Some(1.0)));

        let (_, desc) = rule
            .infer(&doc(&[("min", 1.0.into()), ("max", 9.0.into()), ("step", 2.0.into())]))
            .expect("min + max");
        assert_eq!(desc.unit, None);
        assert_eq!(desc.capability_range, Some(CapabilityRange::new(1.0, 9.0, 2.0)));
    }

    #[test]
    fn mireds_invert_into_kelvin_range() {
        let rule = color_temp_kelvin_from_mireds("color_temp_k", "min_mireds", "max_mireds");
        let d = doc(&[("min_mireds", 153.0.into()), ("max_mireds", 500.0.into())]);
        let inferred = rule.infer(&d).expect("emitted");
        let r = range(&inferred);
        assert_eq!(inferred.1.unit.as_deref(), Some("K"));
        assert!((r.min.unwrap() - 2000.0).abs() < 1e-9);
        assert!((r.max.unwrap() - 6535.95).abs() < 0.5);
        assert_eq!(r.step, Some(50.0));

        assert!(rule.infer(&doc(&[("min_mireds", 153.0.into())])).is_none());
        let zero = doc(&[("min_mireds", 0.0.into()), ("max_mireds", 500.0.into())]);
        assert!(rule.infer(&zero).is_none());
    }

    #[test]
    fn boolean_flag_ignores_value() {
        let rule = boolean_flag("oscillating", "oscillating");
        let (_, desc) = rule
            .infer(&doc(&[("oscillating", false.into())]))
            .expect("present");
        assert_eq!(desc, AttributeDescriptor::boolean().with_optional(true));
        assert!(rule.infer(&RawDocument::new()).is_none());
        // a fan that is off reports `oscillating: null`; the flag stays
        assert!(rule.infer(&doc(&[("oscillating", AttrValue::Null)])).is_some());
    }

    #[test]
    fn gates_compose() {
        let any = percent("brightness_pct").present_if_any(&["brightness", "supported_color_modes"]);
        assert!(any.infer(&RawDocument::new()).is_none());
        assert!(any.infer(&doc(&[("brightness", 128.0.into())])).is_some());
        assert!(any.infer(&doc(&[("brightness", AttrValue::Null)])).is_some());

        let all = number_descriptor("x", "W").present_if_all(&["a", "b"]);
        assert!(all.infer(&doc(&[("a", 1.0.into())])).is_none());
        assert!(all
            .infer(&doc(&[("a", 1.0.into()), ("b", 2.0.into())]))
            .is_some());
    }

    #[test]
    fn color_mode_predicate_is_case_insensitive() {
        let hue = hue_degrees("hue_deg").present_if(color_mode_includes("hs"));
        let d = doc(&[("supported_color_modes", vec!["color_temp", "HS"].into())]);
        let (_, desc) = hue.infer(&d).expect("hs listed");
        assert_eq!(desc.capability_range, Some(CapabilityRange::new(0.0, 360.0, 1.0)));

        let d = doc(&[("supported_color_modes", vec!["onoff"].into())]);
        assert!(hue.infer(&d).is_none());
        assert_eq!(hue.name(), "hue_deg");
    }
}
