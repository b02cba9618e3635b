use pulse_core::{LockFile, Manifest};
use tracing::{info, warn};

use crate::error::ManifestError;
use crate::hashing::manifest_hash;

/// Result of checking a manifest against its lock.
///
/// Mismatches are reported, not raised; the caller decides whether any of
/// them is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Hash recorded in the lock.
    pub expected_hash: String,
    /// Hash of the freshly canonicalized manifest.
    pub actual_hash: String,
    /// Entity ids with no (or a blank) `entity_map` entry.
    pub missing_stable_ids: Vec<String>,
    /// `domain.service` keys with no (or a blank) `service_sig` entry.
    pub missing_service_sigs: Vec<String>,
}

impl VerifyReport {
    pub fn hash_matches(&self) -> bool {
        self.expected_hash == self.actual_hash
    }

    pub fn is_clean(&self) -> bool {
        self.hash_matches() && self.missing_stable_ids.is_empty() && self.missing_service_sigs.is_empty()
    }
}

/// A lock entry that exists but is empty counts as missing.
fn is_blank(entry: Option<&String>) -> bool {
    entry.map_or(true, |v| v.trim().is_empty())
}

pub fn verify(manifest: &Manifest, lock: &LockFile) -> Result<VerifyReport, ManifestError> {
    let actual_hash = manifest_hash(manifest)?;

    let missing_stable_ids: Vec<String> = manifest
        .entities
        .iter()
        .filter(|e| is_blank(lock.entity_map.get(&e.entity_id)))
        .map(|e| e.entity_id.clone())
        .collect();
    let missing_service_sigs: Vec<String> = manifest
        .services
        .iter()
        .map(|s| s.key())
        .filter(|key| is_blank(lock.service_sig.get(key)))
        .collect();

    let report = VerifyReport {
        expected_hash: lock.manifest_hash.clone(),
        actual_hash,
        missing_stable_ids,
        missing_service_sigs,
    };

    if report.is_clean() {
        info!(hash = %report.actual_hash, "Manifest matches lock");
    } else {
        warn!(
            hash_matches = report.hash_matches(),
            missing_stable_ids = report.missing_stable_ids.len(),
            missing_service_sigs = report.missing_service_sigs.len(),
            "Manifest does not match lock"
        );
    }
    Ok(report)
}
