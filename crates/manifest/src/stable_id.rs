use crate::hashing::sha256_hex;

pub const STABLE_ID_PREFIX: &str = "stable:";

/// Hex characters kept from the digest.
pub const STABLE_ID_HEX_LEN: usize = 12;

/// Fallback identity for an entity with no prior record:
/// `stable:` + the first 12 hex chars of SHA-256(seed).
pub fn derive(seed: &str) -> String {
    let hex = sha256_hex(seed.as_bytes());
    format!("{STABLE_ID_PREFIX}{}", &hex[..STABLE_ID_HEX_LEN])
}
