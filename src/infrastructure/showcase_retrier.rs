use std::{future::Future, sync::Arc};

use log::warn;
use tokio::time::sleep;

use crate::{FetcherError, LanguageStat, Repository, RetryPolicy, ShowcaseProvider, UserProfile};

/// A struct that retries a ShowcaseProvider on network failures with exponential backoff strategy.
pub struct ShowcaseRetrier {
    /// The provider to be retried.
    provider: Arc<dyn ShowcaseProvider>,

    /// The retry policy.
    policy: RetryPolicy,
}

impl ShowcaseRetrier {
    /// Creates a new `ShowcaseRetrier` instance with the given retry policy.
    pub fn new(provider: Arc<dyn ShowcaseProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    async fn retry<T, F, Fut>(&self, operation: &str, attempt_fn: F) -> Result<T, FetcherError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, FetcherError>> + Send,
        T: Send,
    {
        let mut retries = 0;

        loop {
            match attempt_fn().await {
                Ok(res) => return Ok(res),
                Err(e) if e.is_retryable() && retries < self.policy.max_retries => {
                    retries += 1;
                    warn!("{operation} attempt #{retries} failed, retrying: {e}");
                    sleep(self.policy.backoff_delay(retries)).await;
                }
                Err(e) => {
                    warn!("{operation} failed after {} attempts: {e}", retries + 1);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl ShowcaseProvider for ShowcaseRetrier {
    async fn fetch_user(&self, handle: &str) -> Result<UserProfile, FetcherError> {
        let provider = self.provider.as_ref();
        self.retry("Fetch user", move || provider.fetch_user(handle))
            .await
    }

    async fn fetch_repositories(&self, handle: &str) -> Result<Vec<Repository>, FetcherError> {
        let provider = self.provider.as_ref();
        self.retry("Fetch repositories", move || {
            provider.fetch_repositories(handle)
        })
        .await
    }

    async fn fetch_languages(
        &self,
        handle: &str,
        repositories: &[Repository],
    ) -> Result<Vec<LanguageStat>, FetcherError> {
        let provider = self.provider.as_ref();
        self.retry("Fetch languages", move || {
            provider.fetch_languages(handle, repositories)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::MockShowcaseProvider;

    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn fetch_success_on_first_attempt() {
        let provider = {
            let mut provider = MockShowcaseProvider::new();
            provider
                .expect_fetch_user()
                .returning(|handle| Ok(UserProfile::dummy(handle)))
                .times(1);

            provider
        };
        let retrier = ShowcaseRetrier::new(Arc::new(provider), policy());

        let user = retrier.fetch_user("octocat").await.unwrap();

        assert_eq!(UserProfile::dummy("octocat"), user);
    }

    #[tokio::test]
    async fn fetch_success_after_retries() {
        let provider = {
            let mut provider = MockShowcaseProvider::new();
            provider
                .expect_fetch_repositories()
                .returning(|_| Err(FetcherError::Network("HTTP 502".to_string())))
                .times(2);
            provider
                .expect_fetch_repositories()
                .returning(|_| Ok(vec![Repository::new(1, "a", 5, false)]))
                .times(1);

            provider
        };
        let retrier = ShowcaseRetrier::new(Arc::new(provider), policy());

        let repositories = retrier.fetch_repositories("octocat").await.unwrap();

        assert_eq!(vec![Repository::new(1, "a", 5, false)], repositories);
    }

    #[tokio::test]
    async fn fetch_failure_after_max_retries() {
        let provider = {
            let mut provider = MockShowcaseProvider::new();
            provider
                .expect_fetch_user()
                .returning(|_| Err(FetcherError::Network("HTTP 502".to_string())))
                .times(3);

            provider
        };
        let retrier = ShowcaseRetrier::new(Arc::new(provider), policy());

        let error = retrier
            .fetch_user("octocat")
            .await
            .expect_err("Expected failure after max retries");

        assert!(error.is_network_failure());
    }

    #[tokio::test]
    async fn fetch_does_not_retry_when_rate_limited() {
        let provider = {
            let mut provider = MockShowcaseProvider::new();
            provider
                .expect_fetch_user()
                .returning(|_| Err(FetcherError::RateLimited { reset_at: 0 }))
                .times(1);

            provider
        };
        let retrier = ShowcaseRetrier::new(Arc::new(provider), policy());

        let error = retrier
            .fetch_user("octocat")
            .await
            .expect_err("Expected rate limit failure");

        assert_eq!(FetcherError::RateLimited { reset_at: 0 }, error);
    }

    #[tokio::test]
    async fn fetch_does_not_retry_parse_errors() {
        let provider = {
            let mut provider = MockShowcaseProvider::new();
            provider
                .expect_fetch_repositories()
                .returning(|_| Err(FetcherError::Parse("missing field".to_string())))
                .times(1);

            provider
        };
        let retrier = ShowcaseRetrier::new(Arc::new(provider), policy());

        retrier
            .fetch_repositories("octocat")
            .await
            .expect_err("Expected parse failure");
    }
}
