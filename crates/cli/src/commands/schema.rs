use anyhow::{Context, Result};
use pulse_manifest::ArtifactStore;
use pulse_schema::{SchemaGenerator, ValueNaming};
use tracing::info;

use super::{EXIT_FAILURE, EXIT_OK};
use crate::cli::SchemaArgs;

pub fn run(args: SchemaArgs) -> Result<u8> {
    let store = ArtifactStore::new(&args.dir);
    let manifest = store
        .load_manifest_any()
        .with_context(|| format!("failed to read manifest in {}", args.dir.display()))?;
    let lock = store
        .load_lock_any()
        .with_context(|| format!("failed to read lock in {}", args.dir.display()))?;

    let (Some((manifest, _)), Some((lock, _))) = (manifest, lock) else {
        eprintln!(
            "Error: manifest and map.lock must exist in {}",
            args.dir.display()
        );
        return Ok(EXIT_FAILURE);
    };

    let naming = if args.prefixed {
        ValueNaming::Prefixed
    } else {
        ValueNaming::Bare
    };
    let generator = SchemaGenerator::new()
        .context("failed to load schema templates")?
        .with_value_naming(naming);
    let bundle = generator
        .generate(&manifest, &lock)
        .context("failed to render schema units")?;
    let written = bundle
        .write_to(&args.out)
        .with_context(|| format!("failed to write schema units to {}", args.out.display()))?;

    for path in &written {
        info!(path = %path.display(), "Wrote schema unit");
    }
    println!(
        "Generated {} schema units in {}",
        written.len(),
        args.out.display()
    );
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_core::{Entity, Manifest, OutputFormat};
    use pulse_manifest::LockBuilder;

    #[test]
    fn writes_units_next_to_package_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("artifacts");
        let out = tmp.path().join("proto");
        let mut m = Manifest::new("2025.8");
        m.entities.push(Entity::new("fan.attic", "fan"));
        let lock = LockBuilder::build(&m, None, Utc::now()).expect("lock");
        ArtifactStore::new(&dir)
            .save(&m, &lock, OutputFormat::Binary)
            .expect("save");

        let code = run(SchemaArgs {
            dir,
            out: out.clone(),
            prefixed: true,
        })
        .expect("run");
        assert_eq!(code, EXIT_OK);
        assert!(out.join("pulse/v1/fan.proto").exists());
        assert!(out.join("pulse/v1/entities.proto").exists());
    }

    #[test]
    fn missing_inputs_fail() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let code = run(SchemaArgs {
            dir: tmp.path().to_path_buf(),
            out: tmp.path().join("proto"),
            prefixed: false,
        })
        .expect("run");
        assert_eq!(code, EXIT_FAILURE);
    }
}
