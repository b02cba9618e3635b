//! Unit constants and numeric conversions used by attribute inference.

pub const DEGREE: &str = "°";
pub const UNIT_CELSIUS: &str = "°C";
pub const UNIT_KELVIN: &str = "K";
pub const UNIT_PERCENT: &str = "%";

/// Spellings that mark a document as reporting Fahrenheit (case-insensitive).
const FAHRENHEIT_SPELLINGS: &[&str] = &["F", "°F", "fahrenheit"];

/// Color temperature granularity in Kelvin.
pub const COLOR_TEMP_STEP_K: f64 = 50.0;

/// Temperature step assumed when a document declares none.
pub const DEFAULT_TEMP_STEP: f64 = 0.5;

const MIREDS_PER_KELVIN: f64 = 1_000_000.0;

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * (5.0 / 9.0)
}

/// Convert a Fahrenheit *interval* (e.g. a step) to Celsius.
pub fn fahrenheit_delta_to_celsius(delta: f64) -> f64 {
    delta * (5.0 / 9.0)
}

pub fn is_fahrenheit(unit: &str) -> bool {
    let unit = unit.trim();
    FAHRENHEIT_SPELLINGS
        .iter()
        .any(|spelling| unit.eq_ignore_ascii_case(spelling))
}

/// Mireds to Kelvin. Non-positive mireds have no Kelvin equivalent.
pub fn mireds_to_kelvin(mireds: f64) -> Option<f64> {
    (mireds > 0.0).then(|| MIREDS_PER_KELVIN / mireds)
}
