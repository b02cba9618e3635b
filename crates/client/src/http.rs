//! HTTP snapshot source for the home-automation REST API.
//!
//! GETs `/api/states` and `/api/services` with a bearer token. Transient
//! failures (408, 429, 5xx, transport errors) are retried with exponential
//! backoff plus jitter; every other non-2xx status fails at once.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pulse_core::{version_or_unknown, EntityState, ServiceDomain, UpstreamConfig};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{is_transient_status, FetchError};
use crate::source::SnapshotSource;

pub const STATES_PATH: &str = "/api/states";
pub const SERVICES_PATH: &str = "/api/services";

const BACKOFF_BASE_MS: u64 = 250;
const BACKOFF_MAX_MS: u64 = 8_000;
const JITTER_MS: u32 = 250;

/// Client for the upstream REST API.
#[derive(Debug, Clone)]
pub struct HaClient {
    base_url: String,
    token: String,
    version: Option<String>,
    max_retries: u32,
    client: reqwest::Client,
}

impl HaClient {
    pub fn new(
        base_url: &str,
        token: &str,
        timeout: Duration,
        max_retries: u32,
        version: Option<String>,
    ) -> Result<Self, FetchError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(FetchError::Config("base URL is empty".into()));
        }
        if token.trim().is_empty() {
            return Err(FetchError::Config("access token is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            token: token.to_string(),
            version,
            max_retries,
            client,
        })
    }

    /// Build from env-derived upstream settings; URL and token are required.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| FetchError::Config("HA_URL is not set".into()))?;
        let token = config
            .token
            .as_deref()
            .ok_or_else(|| FetchError::Config("HA_TOKEN is not set".into()))?;
        Self::new(
            url,
            token,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
            config.version.clone(),
        )
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` as JSON, retrying transient failures up to `max_retries`
    /// times.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint(path);
        let mut attempt = 0u32;
        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient fetch failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transient {
                status: None,
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            if is_transient_status(code) {
                return Err(FetchError::Transient {
                    status: Some(code),
                    url: url.to_string(),
                    reason: format!("{status}"),
                });
            }
            return Err(FetchError::Status {
                status: code,
                url: url.to_string(),
                body,
            });
        }

        let value = response.json::<T>().await.map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(url = %url, %status, "Fetched");
        Ok(value)
    }
}

#[async_trait::async_trait]
impl SnapshotSource for HaClient {
    async fn fetch_states(&self) -> Result<Vec<EntityState>, FetchError> {
        self.get_json(STATES_PATH).await
    }

    async fn fetch_services(&self) -> Result<Vec<ServiceDomain>, FetchError> {
        self.get_json(SERVICES_PATH).await
    }

    fn source_version(&self) -> String {
        version_or_unknown(self.version.as_deref())
    }
}

/// Delay before retry number `attempt + 1`: 250 ms doubling per attempt,
/// capped at 8 s, plus up to 250 ms of jitter.
pub fn backoff_delay(attempt: u32) -> Duration {
    let exp = BACKOFF_BASE_MS.saturating_mul(1u64 << attempt.min(16));
    Duration::from_millis(exp.min(BACKOFF_MAX_MS) + jitter_ms())
}

/// Jitter from the sub-second clock; avoids pulling in a RNG.
fn jitter_ms() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    u64::from(nanos % JITTER_MS)
}
