//! Identifier helpers for generated proto names.

/// `hvac_mode` → `HvacMode`. Any non-alphanumeric character separates words.
pub fn pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Upper-case an enum value into a proto identifier: characters outside
/// `[A-Z0-9_]` become `_`, and a leading digit gets a `V_` prefix.
pub fn enum_value_name(value: &str) -> String {
    let name: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("V_{name}"),
        Some(_) => name,
        None => "EMPTY".to_string(),
    }
}
