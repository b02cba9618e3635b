//! Encodings for persisted artifacts.
//!
//! Both encodings are deterministic for identical values and round-trip
//! losslessly:
//! - **JSON**: pretty-printed `serde_json`
//! - **Binary**: 4-byte magic tag, 4-byte big-endian payload length, then
//!   named MessagePack (`rmp_serde::to_vec_named`)

use pulse_core::{LockFile, Manifest};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ManifestError;

const HEADER_LEN: usize = 8;

/// A value persisted by the artifact store.
pub trait Artifact: Serialize + DeserializeOwned {
    /// Magic tag opening the binary frame.
    const MAGIC: [u8; 4];
    /// Human-readable name for errors.
    const NAME: &'static str;
}

impl Artifact for Manifest {
    const MAGIC: [u8; 4] = *b"PMF1";
    const NAME: &'static str = "manifest";
}

impl Artifact for LockFile {
    const MAGIC: [u8; 4] = *b"PML1";
    const NAME: &'static str = "lock";
}

pub fn to_json<T: Artifact>(value: &T) -> Result<String, ManifestError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json<T: Artifact>(json: &str) -> Result<T, ManifestError> {
    Ok(serde_json::from_str(json)?)
}

pub fn to_binary<T: Artifact>(value: &T) -> Result<Vec<u8>, ManifestError> {
    let payload = rmp_serde::to_vec_named(value)?;
    let len = u32::try_from(payload.len()).map_err(|_| frame_error::<T>("payload exceeds 4 GiB"))?;

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&T::MAGIC);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

pub fn from_binary<T: Artifact>(bytes: &[u8]) -> Result<T, ManifestError> {
    if bytes.len() < HEADER_LEN {
        return Err(frame_error::<T>("truncated header"));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if header[..4] != T::MAGIC {
        return Err(frame_error::<T>("bad magic tag"));
    }
    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if payload.len() != len {
        return Err(ManifestError::Frame {
            artifact: T::NAME,
            reason: format!("length prefix {len} but {} payload bytes", payload.len()),
        });
    }
    Ok(rmp_serde::from_slice(payload)?)
}

fn frame_error<T: Artifact>(reason: &str) -> ManifestError {
    ManifestError::Frame {
        artifact: T::NAME,
        reason: reason.to_string(),
    }
}
