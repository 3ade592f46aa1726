use model::error::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    /// The API answered with HTTP 429.
    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },

    /// The API answered with HTTP 304.
    #[error("Not modified")]
    NotModified,

    /// The API rejected the credentials (HTTP 401/403) or a token could not be obtained.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Any other non-success status.
    #[error("Sheets API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record payload could not be turned into a sheet row.
    #[error("Unable to decode the record at index {index}: {source}")]
    InvalidPayload {
        index: usize,
        #[source]
        source: ModelError,
    },

    /// The rate limit persisted through every configured retry.
    #[error("Rate limit exceeded, retries: {retries}, error: {message}")]
    RetriesExhausted { retries: u64, message: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl SheetsError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SheetsError::RateLimited { .. })
    }

    pub fn is_not_modified(&self) -> bool {
        matches!(self, SheetsError::NotModified)
    }
}
