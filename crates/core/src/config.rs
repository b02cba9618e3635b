use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Version label used when the upstream system does not report one.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Pick `label` unless it is missing or blank, in which case `unknown`.
pub fn version_or_unknown(label: Option<&str>) -> String {
    label
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_VERSION)
        .to_string()
}

// ── Output format ─────────────────────────────────────────────

/// Encoding used for persisted manifest/lock artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Length-prefixed MessagePack.
    #[default]
    Binary,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Binary => "msgpack",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "msgpack" | "bin" => Ok(OutputFormat::Binary),
            "json" => Ok(OutputFormat::Json),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown output format '{other}' (expected binary or json)"
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Binary => write!(f, "binary"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub upstream: UpstreamConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PULSE_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("PULSE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            upstream: UpstreamConfig::from_env_profiled(p),
            output: OutputConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  upstream:  url={}, token={}, version={}",
            self.upstream.url.as_deref().unwrap_or("(none)"),
            if self.upstream.token.is_some() { "(set)" } else { "(none)" },
            self.upstream.version_label()
        );
        tracing::info!(
            "  fetch:     timeout={}s, max_retries={}",
            self.upstream.timeout_secs,
            self.upstream.max_retries
        );
        tracing::info!(
            "  output:    dir={}, format={}",
            self.output.out_dir.display(),
            self.output.format
        );
    }
}

// ── Upstream (snapshot source) ────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub version: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl UpstreamConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_opt(p, "HA_URL"),
            token: profiled_env_opt(p, "HA_TOKEN"),
            version: profiled_env_opt(p, "HA_VERSION"),
            timeout_secs: profiled_env_u64(p, "HA_TIMEOUT_SECS", 15),
            max_retries: profiled_env_u32(p, "HA_MAX_RETRIES", 2),
        }
    }

    /// Both a URL and a token are needed to talk to the live system.
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.token.is_some()
    }

    pub fn version_label(&self) -> String {
        version_or_unknown(self.version.as_deref())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            version: None,
            timeout_secs: 15,
            max_retries: 2,
        }
    }
}

// ── Output ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub out_dir: PathBuf,
    pub format: OutputFormat,
}

impl OutputConfig {
    fn from_env_profiled(p: &str) -> Self {
        let format = profiled_env_or(p, "PULSE_FORMAT", "binary");
        Self {
            out_dir: PathBuf::from(profiled_env_or(p, "PULSE_OUT_DIR", ".")),
            format: format.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to binary output");
                OutputFormat::Binary
            }),
        }
    }
}
