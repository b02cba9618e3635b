use anyhow::{Context, Result};
use pulse_manifest::{verify, ArtifactStore, VerifyReport};

use super::{EXIT_FAILURE, EXIT_MISSING, EXIT_OK};
use crate::cli::ValidateArgs;

pub fn run(args: ValidateArgs) -> Result<u8> {
    let store = ArtifactStore::new(&args.dir);
    let manifest = store
        .load_manifest_any()
        .with_context(|| format!("failed to read manifest in {}", args.dir.display()))?;
    let lock = store
        .load_lock_any()
        .with_context(|| format!("failed to read lock in {}", args.dir.display()))?;

    let (Some((manifest, _)), Some((lock, _))) = (manifest, lock) else {
        eprintln!(
            "Missing manifest or lock in {} (expected manifest.{{msgpack,json}} and map.lock.{{msgpack,json}})",
            args.dir.display()
        );
        return Ok(EXIT_MISSING);
    };

    let report = verify(&manifest, &lock).context("failed to hash manifest")?;
    print_report(&report);

    if args.strict && !report.is_clean() {
        return Ok(EXIT_FAILURE);
    }
    Ok(EXIT_OK)
}

fn print_report(report: &VerifyReport) {
    for id in &report.missing_stable_ids {
        eprintln!("[MISSING] stable_id for {id}");
    }
    for key in &report.missing_service_sigs {
        eprintln!("[MISSING] service signature for {key}");
    }
    println!(
        "Hash match: {}",
        if report.hash_matches() { "OK" } else { "FAIL" }
    );
    println!("Entities without stable_id: {}", report.missing_stable_ids.len());
    println!("Services without signature: {}", report.missing_service_sigs.len());
}
