use pulse_core::Manifest;
use sha2::{Digest, Sha256};

use crate::canon::canonicalize;
use crate::error::ManifestError;

/// SHA-256 of `bytes` as 64 lowercase hex chars.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}

/// Content hash of a manifest: SHA-256 over the compact JSON of its
/// canonical form. Input order never affects the result.
pub fn manifest_hash(manifest: &Manifest) -> Result<String, ManifestError> {
    let canonical = canonicalize(manifest);
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(sha256_hex(&bytes))
}
