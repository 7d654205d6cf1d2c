use std::time::Duration;

/// The default staleness window of cached GitHub queries.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(10 * 60);

/// The default time budget of a single HTTP request, from connection to the end of the body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The default number of automatic retries after a network failure.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// A retry policy with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The maximum number of retries after the first attempt.
    pub max_retries: u32,

    /// The base delay for exponential backoff.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a new `RetryPolicy` instance.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// The delay to wait before the retry number `attempt` (starting at 1).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * (2u32.pow(attempt.min(31)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, Duration::from_millis(500))
    }
}
