mod error;

pub use error::StoreError;

use std::path::{Path, PathBuf};

use pulse_core::{LockFile, Manifest, OutputFormat};
use tracing::{debug, info};

use crate::codec::{self, Artifact};

const MANIFEST_STEM: &str = "manifest";
const LOCK_STEM: &str = "map.lock";

/// Probe order when the format is not known up front.
const PROBE_ORDER: [OutputFormat; 2] = [OutputFormat::Binary, OutputFormat::Json];

/// Filesystem-backed manifest/lock persistence.
///
/// ```text
/// <dir>/
///   manifest.msgpack | manifest.json
///   map.lock.msgpack | map.lock.json
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

/// Where [`ArtifactStore::save`] put things.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    pub manifest: PathBuf,
    pub lock: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self, format: OutputFormat) -> PathBuf {
        self.dir.join(format!("{MANIFEST_STEM}.{}", format.extension()))
    }

    pub fn lock_path(&self, format: OutputFormat) -> PathBuf {
        self.dir.join(format!("{LOCK_STEM}.{}", format.extension()))
    }

    // ── Write ───────────────────────────────────────────────────

    /// Write manifest and lock in `format`, creating the directory if needed.
    pub fn save(
        &self,
        manifest: &Manifest,
        lock: &LockFile,
        format: OutputFormat,
    ) -> Result<SavedArtifacts, StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let saved = SavedArtifacts {
            manifest: self.manifest_path(format),
            lock: self.lock_path(format),
        };
        write_artifact(&saved.manifest, manifest, format)?;
        write_artifact(&saved.lock, lock, format)?;
        info!(
            manifest = %saved.manifest.display(),
            lock = %saved.lock.display(),
            %format,
            "Artifacts written"
        );
        Ok(saved)
    }

    /// Remove manifest and lock files of every format. Returns how many
    /// files were deleted.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for format in PROBE_ORDER {
            for path in [self.manifest_path(format), self.lock_path(format)] {
                if path.exists() {
                    std::fs::remove_file(&path)?;
                    debug!(path = %path.display(), "Removed stale artifact");
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    // ── Read ────────────────────────────────────────────────────

    pub fn load_manifest(&self, format: OutputFormat) -> Result<Option<Manifest>, StoreError> {
        read_artifact(&self.manifest_path(format), format)
    }

    pub fn load_lock(&self, format: OutputFormat) -> Result<Option<LockFile>, StoreError> {
        read_artifact(&self.lock_path(format), format)
    }

    /// First manifest found, binary preferred.
    pub fn load_manifest_any(&self) -> Result<Option<(Manifest, OutputFormat)>, StoreError> {
        for format in PROBE_ORDER {
            if let Some(manifest) = self.load_manifest(format)? {
                return Ok(Some((manifest, format)));
            }
        }
        Ok(None)
    }

    /// First lock found, binary preferred.
    pub fn load_lock_any(&self) -> Result<Option<(LockFile, OutputFormat)>, StoreError> {
        for format in PROBE_ORDER {
            if let Some(lock) = self.load_lock(format)? {
                return Ok(Some((lock, format)));
            }
        }
        Ok(None)
    }
}

/// Infer the encoding of a file from its extension. Anything that is not
/// `.json` is treated as binary.
pub fn format_of(path: &Path) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
        _ => OutputFormat::Binary,
    }
}

/// Read one artifact from an arbitrary path, picking the codec by extension.
pub fn read_path<T: Artifact>(path: &Path) -> Result<Option<T>, StoreError> {
    read_artifact(path, format_of(path))
}

fn write_artifact<T: Artifact>(path: &Path, value: &T, format: OutputFormat) -> Result<(), StoreError> {
    let codec_err = |source| StoreError::Codec {
        path: path.to_path_buf(),
        source,
    };
    match format {
        OutputFormat::Json => std::fs::write(path, codec::to_json(value).map_err(codec_err)?)?,
        OutputFormat::Binary => std::fs::write(path, codec::to_binary(value).map_err(codec_err)?)?,
    }
    Ok(())
}

fn read_artifact<T: Artifact>(path: &Path, format: OutputFormat) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let codec_err = |source| StoreError::Codec {
        path: path.to_path_buf(),
        source,
    };
    let value = match format {
        OutputFormat::Json => {
            let json = std::fs::read_to_string(path)?;
            codec::from_json(&json).map_err(codec_err)?
        }
        OutputFormat::Binary => {
            let bytes = std::fs::read(path)?;
            codec::from_binary(&bytes).map_err(codec_err)?
        }
    };
    Ok(Some(value))
}
