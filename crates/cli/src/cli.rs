use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pulse_core::{Config, OutputFormat};

/// Discover a home-automation installation and pin it down as a
/// manifest, a lock file and generated schema units.
#[derive(Parser, Debug)]
#[command(name = "pulse-map", version, about = "Map a home-automation installation into a locked manifest")]
pub struct Cli {
    /// Config profile; env keys are looked up as {PROFILE}_{KEY} first
    #[arg(long, global = true, env = "PULSE_PROFILE")]
    pub profile: Option<String>,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::for_profile(self.profile.as_deref().unwrap_or_default())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a snapshot, build the manifest and write manifest + lock
    Discover(DiscoverArgs),
    /// Check a manifest against its lock
    Validate(ValidateArgs),
    /// Per-domain counts and attribute coverage for a manifest
    Stats(StatsArgs),
    /// Generate protobuf schema units from a manifest and its lock
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Output directory (default: PULSE_OUT_DIR, then ".")
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Base URL of the live system (default: HA_URL)
    #[arg(long, value_name = "URL")]
    pub ha_url: Option<String>,

    /// Access token (default: HA_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    pub ha_token: Option<String>,

    /// Version label recorded in the manifest (default: HA_VERSION, then "unknown")
    #[arg(long, value_name = "VERSION")]
    pub ha_version: Option<String>,

    /// Use the built-in demo snapshot instead of a live system
    #[arg(long)]
    pub demo: bool,

    /// Write JSON instead of the binary encoding
    #[arg(long, conflicts_with = "format")]
    pub json: bool,

    /// Artifact encoding: binary or json (default: PULSE_FORMAT)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory holding the manifest and lock
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Exit non-zero when anything is out of place
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Manifest file; `.json` is read as JSON, anything else as binary
    #[arg(long, value_name = "FILE", default_value = "manifest.msgpack")]
    pub manifest: PathBuf,

    /// How many domains and attributes to list
    #[arg(long, value_name = "N", default_value = "10")]
    pub top: usize,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Directory holding the manifest and lock
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Output root for the generated units
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Prefix enum values with their enum name (avoids package-level collisions)
    #[arg(long)]
    pub prefixed: bool,
}
