use thiserror::Error;

#[derive(Debug, Error)]
pub enum KaspiError {
    #[error("unsupported platform: expected a kaspi.kz product link, got \"{url}\"")]
    UnsupportedPlatform { url: String },

    #[error("could not extract a product id from \"{url}\"")]
    ProductIdNotFound { url: String },

    #[error("Kaspi API error: {status}")]
    UnexpectedStatus { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid proxy URL \"{url}\": {reason}")]
    InvalidProxy { url: String, reason: String },

    #[error("invalid offers endpoint base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl KaspiError {
    /// Returns `true` for failures that came from talking to the marketplace:
    /// transport errors, non-2xx statuses and undecodable bodies.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus { .. } | Self::Http(_) | Self::Deserialize { .. }
        )
    }

    /// The upstream HTTP status, when the failure carried one.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
