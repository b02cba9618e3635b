use thiserror::Error;

/// Errors raised while hashing or encoding manifest artifacts.
///
/// None of these occur for well-formed in-memory values; they surface
/// corrupt persisted artifacts or a broken serializer.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("MessagePack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("MessagePack decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Invalid {artifact} frame: {reason}")]
    Frame {
        artifact: &'static str,
        reason: String,
    },
}
