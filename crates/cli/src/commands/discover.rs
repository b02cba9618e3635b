use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use pulse_client::{fetch_snapshot, DemoSource, EmptySource, HaClient, SnapshotSource};
use pulse_core::{Config, OutputFormat, UpstreamConfig};
use pulse_manifest::{canonicalize, ArtifactStore, LockBuilder, ManifestBuilder};
use tracing::{info, warn};

use super::EXIT_OK;
use crate::cli::DiscoverArgs;

/// Where the snapshot comes from, decided once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Demo,
    Live,
    SnapshotOnly,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Demo => write!(f, "demo"),
            Mode::Live => write!(f, "live"),
            Mode::SnapshotOnly => write!(f, "snapshot-only"),
        }
    }
}

/// Flags win over the profiled env values.
fn upstream(args: &DiscoverArgs, config: &Config) -> UpstreamConfig {
    let mut upstream = config.upstream.clone();
    if let Some(url) = args.ha_url.as_ref().filter(|s| !s.trim().is_empty()) {
        upstream.url = Some(url.clone());
    }
    if let Some(token) = args.ha_token.as_ref().filter(|s| !s.trim().is_empty()) {
        upstream.token = Some(token.clone());
    }
    if let Some(version) = &args.ha_version {
        upstream.version = Some(version.clone());
    }
    upstream
}

fn mode(demo: bool, upstream: &UpstreamConfig) -> Mode {
    if demo {
        Mode::Demo
    } else if upstream.is_configured() {
        Mode::Live
    } else {
        Mode::SnapshotOnly
    }
}

fn output_format(args: &DiscoverArgs, config: &Config) -> OutputFormat {
    if args.json {
        OutputFormat::Json
    } else {
        args.format.unwrap_or(config.output.format)
    }
}

pub async fn run(args: DiscoverArgs, config: &Config) -> Result<u8> {
    let upstream = upstream(&args, config);
    let mode = mode(args.demo, &upstream);
    let format = output_format(&args, config);
    let out_dir: PathBuf = args.out.clone().unwrap_or_else(|| config.output.out_dir.clone());

    let source: Box<dyn SnapshotSource> = match mode {
        Mode::Demo => Box::new(DemoSource {
            version: upstream.version.clone(),
        }),
        Mode::Live => Box::new(HaClient::from_config(&upstream).context("invalid upstream settings")?),
        Mode::SnapshotOnly => {
            warn!("No HA_URL/HA_TOKEN configured and --demo not set; writing an empty manifest");
            Box::new(EmptySource {
                version: upstream.version.clone(),
            })
        }
    };
    info!(%mode, out = %out_dir.display(), %format, "Starting discovery");

    let snapshot = fetch_snapshot(source.as_ref())
        .await
        .with_context(|| format!("failed to fetch {mode} snapshot"))?;

    let manifest = canonicalize(&ManifestBuilder::standard().build(
        &snapshot.version,
        &snapshot.states,
        &snapshot.services,
    ));

    let store = ArtifactStore::new(&out_dir);
    // Read the previous lock before clearing so stable ids carry over.
    let previous = match store.load_lock_any() {
        Ok(found) => found.map(|(lock, _)| lock),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable previous lock");
            None
        }
    };
    store
        .clear()
        .with_context(|| format!("failed to clear {}", out_dir.display()))?;

    let lock = LockBuilder::build(&manifest, previous.as_ref(), Utc::now()).context("failed to build lock")?;
    let saved = store
        .save(&manifest, &lock, format)
        .with_context(|| format!("failed to write artifacts to {}", out_dir.display()))?;

    println!("Wrote:");
    println!("  {}", saved.manifest.display());
    println!("  {}", saved.lock.display());
    println!(
        "Entities: {}, Services: {}",
        manifest.entities.len(),
        manifest.services.len()
    );
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{LockFile, Manifest};

    fn args(out: &std::path::Path) -> DiscoverArgs {
        DiscoverArgs {
            out: Some(out.to_path_buf()),
            ha_url: None,
            ha_token: None,
            ha_version: None,
            demo: true,
            json: false,
            format: None,
        }
    }

    fn config() -> Config {
        Config {
            profile: String::new(),
            upstream: UpstreamConfig::default(),
            output: pulse_core::OutputConfig {
                out_dir: PathBuf::from("."),
                format: OutputFormat::Binary,
            },
        }
    }

    #[test]
    fn mode_selection() {
        let mut upstream = UpstreamConfig::default();
        assert_eq!(mode(false, &upstream), Mode::SnapshotOnly);
        upstream.url = Some("http://ha.local:8123".into());
        upstream.token = Some("t".into());
        assert_eq!(mode(false, &upstream), Mode::Live);
        assert_eq!(mode(true, &upstream), Mode::Demo);
    }

    #[test]
    fn flags_override_env_values() {
        let mut cfg = config();
        cfg.upstream.url = Some("http://env:8123".into());
        let mut a = args(std::path::Path::new("."));
        a.ha_url = Some("http://flag:8123".into());
        a.ha_token = Some("  ".into());
        a.ha_version = Some("2025.8.1".into());

        let up = upstream(&a, &cfg);
        assert_eq!(up.url.as_deref(), Some("http://flag:8123"));
        assert!(up.token.is_none());
        assert_eq!(up.version_label(), "2025.8.1");

        assert_eq!(output_format(&a, &cfg), OutputFormat::Binary);
        a.json = true;
        assert_eq!(output_format(&a, &cfg), OutputFormat::Json);
    }

    #[tokio::test]
    async fn demo_run_writes_artifacts_and_keeps_ids() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cfg = config();

        run(args(tmp.path()), &cfg).await.expect("first run");
        let store = ArtifactStore::new(tmp.path());
        let (first, format): (LockFile, _) = store.load_lock_any().expect("load").expect("lock");
        assert_eq!(format, OutputFormat::Binary);

        // switching to JSON removes the binary files and keeps the identities
        let mut json = args(tmp.path());
        json.json = true;
        run(json, &cfg).await.expect("second run");
        assert!(store.load_lock(OutputFormat::Binary).expect("load").is_none());
        let (second, format) = store.load_lock_any().expect("load").expect("lock");
        assert_eq!(format, OutputFormat::Json);
        assert_eq!(second.entity_map, first.entity_map);
        assert_eq!(second.manifest_hash, first.manifest_hash);

        let (manifest, _): (Manifest, _) = store.load_manifest_any().expect("load").expect("manifest");
        assert_eq!(manifest.source_version, "demo");
        assert_eq!(manifest.entities.len(), 2);
    }

    #[tokio::test]
    async fn demo_run_records_version_flag() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut a = args(tmp.path());
        a.ha_version = Some("2025.9.0".into());
        run(a, &config()).await.expect("run");

        let (manifest, _): (Manifest, _) = ArtifactStore::new(tmp.path())
            .load_manifest_any()
            .expect("load")
            .expect("manifest");
        assert_eq!(manifest.source_version, "2025.9.0");
    }
}
