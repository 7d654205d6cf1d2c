use std::{sync::Arc, time::Duration};

use crate::{
    CacheKey, FetcherError, KeyedCache, LANGUAGE_SAMPLE_SIZE, LanguageStat, Repository,
    ShowcaseProvider, UserProfile,
};

/// A ShowcaseProvider memoizing each query of the wrapped provider for a staleness window.
pub struct ShowcaseCache {
    provider: Arc<dyn ShowcaseProvider>,
    users: KeyedCache<UserProfile>,
    repositories: KeyedCache<Vec<Repository>>,
    languages: KeyedCache<Vec<LanguageStat>>,
}

impl ShowcaseCache {
    /// Creates a new `ShowcaseCache` instance with the given staleness window.
    pub fn new(provider: Arc<dyn ShowcaseProvider>, staleness_window: Duration) -> Self {
        Self {
            provider,
            users: KeyedCache::new(staleness_window),
            repositories: KeyedCache::new(staleness_window),
            languages: KeyedCache::new(staleness_window),
        }
    }

    /// Drops the cached result of a query.
    pub async fn invalidate(&self, key: &CacheKey) {
        match key {
            CacheKey::User(_) => self.users.invalidate(key).await,
            CacheKey::Repositories(_) => self.repositories.invalidate(key).await,
            CacheKey::Languages { .. } => self.languages.invalidate(key).await,
        }
    }

    /// Drops every cached result.
    pub async fn clear(&self) {
        self.users.clear().await;
        self.repositories.clear().await;
        self.languages.clear().await;
    }
}

#[async_trait::async_trait]
impl ShowcaseProvider for ShowcaseCache {
    async fn fetch_user(&self, handle: &str) -> Result<UserProfile, FetcherError> {
        let provider = Arc::clone(&self.provider);
        let handle_owned = handle.to_string();
        self.users
            .get_or_fetch(CacheKey::User(handle.to_string()), move || async move {
                provider.fetch_user(&handle_owned).await
            })
            .await
    }

    async fn fetch_repositories(&self, handle: &str) -> Result<Vec<Repository>, FetcherError> {
        let provider = Arc::clone(&self.provider);
        let handle_owned = handle.to_string();
        self.repositories
            .get_or_fetch(
                CacheKey::Repositories(handle.to_string()),
                move || async move { provider.fetch_repositories(&handle_owned).await },
            )
            .await
    }

    async fn fetch_languages(
        &self,
        handle: &str,
        repositories: &[Repository],
    ) -> Result<Vec<LanguageStat>, FetcherError> {
        let sampled = repositories
            .iter()
            .take(LANGUAGE_SAMPLE_SIZE)
            .cloned()
            .collect::<Vec<_>>();
        let key = CacheKey::languages(handle, &sampled);
        let provider = Arc::clone(&self.provider);
        let handle_owned = handle.to_string();
        self.languages
            .get_or_fetch(key, move || async move {
                provider.fetch_languages(&handle_owned, &sampled).await
            })
            .await
    }
}
