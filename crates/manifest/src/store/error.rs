use std::path::PathBuf;

use thiserror::Error;

use crate::error::ManifestError;

/// Errors produced by [`ArtifactStore`](super::ArtifactStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Codec error in {path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },
}
