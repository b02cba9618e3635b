use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::SchemaError;

/// One generated file, addressed relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaUnit {
    pub path: String,
    pub content: String,
}

/// Every unit produced by one generator run, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaBundle {
    pub units: Vec<SchemaUnit>,
}

impl SchemaBundle {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.units
            .iter()
            .find(|u| u.path == path)
            .map(|u| u.content.as_str())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|u| u.path.as_str())
    }

    /// Write every unit under `dir`, creating directories as needed.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
        let mut written = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            let path = dir.join(&unit.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &unit.content)?;
            written.push(path);
        }
        info!(dir = %dir.display(), units = written.len(), "Schema written");
        Ok(written)
    }
}
