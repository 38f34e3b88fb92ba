use thiserror::Error;

/// Result type alias for Alerts API operations
pub type Result<T> = std::result::Result<T, AlertsError>;

/// Errors that can occur when interacting with the Alerts API
#[derive(Debug, Error)]
pub enum AlertsError {
    /// Failed to build HTTP client
    #[error("failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Invalid or missing configuration detected at construction time
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response (DNS failure,
    /// connection refused, timeout)
    #[error("transport error: {0}")]
    Transport(#[source] reqwest_middleware::Error),

    /// A successful response body did not match the expected shape
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The API returned a non-success status with an error payload
    #[error("API error: HTTP {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the service error payload
        message: String,
    },

    /// The requested resource does not exist
    ///
    /// Produced both from a true HTTP 404 and from a list-scan lookup
    /// that matched nothing; callers cannot distinguish the two.
    #[error("not found: {0}")]
    NotFound(String),
}

impl AlertsError {
    /// Returns `true` for the not-found variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
