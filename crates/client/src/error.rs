/// Errors raised while fetching a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Worth retrying: 408, 429, 5xx or a transport failure (`status` is
    /// `None` when no response arrived).
    #[error("Transient failure from {url}: {reason}")]
    Transient {
        status: Option<u16>,
        url: String,
        reason: String,
    },

    /// Any other non-2xx response. Never retried.
    #[error("HTTP {status} from {url}: {body}")]
    Status { status: u16, url: String, body: String },

    /// The response arrived but was not the expected JSON.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The client could not be set up.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }
}

/// 408, 429 and every 5xx are worth retrying.
pub fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}
