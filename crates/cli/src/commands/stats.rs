use anyhow::{bail, Context, Result};
use pulse_core::Manifest;
use pulse_manifest::store::read_path;
use pulse_manifest::ManifestStats;

use super::EXIT_OK;
use crate::cli::StatsArgs;

pub fn run(args: StatsArgs) -> Result<u8> {
    let manifest: Option<Manifest> = read_path(&args.manifest)
        .with_context(|| format!("failed to read {}", args.manifest.display()))?;
    let Some(manifest) = manifest else {
        bail!("manifest not found: {}", args.manifest.display());
    };

    print!("{}", render(&ManifestStats::collect(&manifest), args.top));
    Ok(EXIT_OK)
}

fn render(stats: &ManifestStats, top: usize) -> String {
    let mut out = format!("Entities: {} Services: {}\n", stats.entities, stats.services);
    out.push_str("Top domains:\n");
    for (domain, count) in stats.top_domains(top) {
        out.push_str(&format!(" {domain:<16} {count:>5}\n"));
    }
    out.push_str("Top attributes (domain.attr):\n");
    for (attr, count) in stats.top_attributes(top) {
        out.push_str(&format!(" {attr:<24} {count:>5}\n"));
    }
    out
}
