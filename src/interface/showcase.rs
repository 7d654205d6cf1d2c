use crate::{FetcherError, LanguageStat, Repository, UserProfile};

/// A trait for retrieving the data showcased for a GitHub user.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ShowcaseProvider: Sync + Send {
    /// Fetches the profile of a user.
    async fn fetch_user(&self, handle: &str) -> Result<UserProfile, FetcherError>;

    /// Fetches the non-fork repositories of a user, most starred first.
    async fn fetch_repositories(&self, handle: &str) -> Result<Vec<Repository>, FetcherError>;

    /// Fetches the top languages over the most starred of the given repositories.
    async fn fetch_languages(
        &self,
        handle: &str,
        repositories: &[Repository],
    ) -> Result<Vec<LanguageStat>, FetcherError>;
}
