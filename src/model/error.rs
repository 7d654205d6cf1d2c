use thiserror::Error;

/// The standard result type used throughout the application.
pub type StdResult<T> = Result<T, anyhow::Error>;

/// Fetcher error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetcherError {
    /// Transport error or non-2xx response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response with an exhausted rate limit budget
    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited {
        /// Unix timestamp (seconds) at which the budget resets
        reset_at: i64,
    },

    /// Parse error
    #[error("Parsing error: {0}")]
    Parse(String),
}

impl FetcherError {
    /// Whether the error comes from the network (transport failure or non-2xx status).
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            FetcherError::Network(_) | FetcherError::RateLimited { .. }
        )
    }

    /// Whether another attempt of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetcherError::Network(_))
    }
}

impl From<reqwest::Error> for FetcherError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FetcherError::Parse(error.to_string())
        } else {
            FetcherError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for FetcherError {
    fn from(error: serde_json::Error) -> Self {
        FetcherError::Parse(error.to_string())
    }
}

/// Blog error
#[derive(Error, Debug)]
pub enum BlogError {
    /// Malformed author input, rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// A write was attempted without a session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The session user is not an admin
    #[error("Not authorized: admin role required")]
    NotAuthorized,

    /// The store rejected or failed the operation
    #[error("Store error: {0}")]
    Store(String),
}

impl From<reqwest::Error> for BlogError {
    fn from(error: reqwest::Error) -> Self {
        BlogError::Store(error.to_string())
    }
}
