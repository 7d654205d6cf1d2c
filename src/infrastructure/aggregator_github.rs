use std::sync::Arc;

use log::{info, warn};
use serde::de::DeserializeOwned;

use crate::{
    ApiFetcher, Endpoint, FetcherError, LanguageBytes, LanguageStat, Repository, ShowcaseProvider,
    UserProfile,
};

/// The number of most starred repositories sampled for language statistics.
pub const LANGUAGE_SAMPLE_SIZE: usize = 10;

/// The number of languages kept in the statistics.
pub const TOP_LANGUAGES: usize = 5;

/// The language filter letting every repository through.
pub const ALL_LANGUAGES: &str = "All";

/// Aggregates the showcase data of a user from the GitHub REST API.
pub struct GitHubAggregator {
    fetcher: Arc<dyn ApiFetcher>,
}

impl GitHubAggregator {
    /// Creates a new `GitHubAggregator` instance with the given fetcher.
    pub fn new(fetcher: Arc<dyn ApiFetcher>) -> Self {
        Self { fetcher }
    }

    async fn fetch_as<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, FetcherError> {
        let value = self.fetcher.fetch(endpoint).await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Fetches the languages of one repository, an empty breakdown if anything fails.
    async fn fetch_repository_languages(
        fetcher: Arc<dyn ApiFetcher>,
        endpoint: Endpoint,
    ) -> LanguageBytes {
        let breakdown = match fetcher.fetch(&endpoint).await {
            Ok(value) => serde_json::from_value::<LanguageBytes>(value).map_err(FetcherError::from),
            Err(e) => Err(e),
        };

        breakdown.unwrap_or_else(|e| {
            warn!("Ignoring languages of {endpoint}: {e}");
            LanguageBytes::new()
        })
    }
}

/// Drops forks and orders by stars, keeping the source order of equal stars.
pub fn showcased_repositories(repositories: Vec<Repository>) -> Vec<Repository> {
    let mut repositories = repositories
        .into_iter()
        .filter(|repository| !repository.is_fork())
        .collect::<Vec<_>>();
    repositories.sort_by(|a, b| b.total_stars().cmp(a.total_stars()));

    repositories
}

/// Keeps the repositories whose primary language matches `language`, ignoring case.
///
/// [ALL_LANGUAGES] keeps every repository, and repositories without a primary language only pass
/// that filter.
pub fn filter_by_language(repositories: Vec<Repository>, language: &str) -> Vec<Repository> {
    if language.eq_ignore_ascii_case(ALL_LANGUAGES) {
        return repositories;
    }

    repositories
        .into_iter()
        .filter(|repository| {
            repository
                .language
                .as_deref()
                .is_some_and(|primary| primary.to_lowercase() == language.to_lowercase())
        })
        .collect()
}

#[async_trait::async_trait]
impl ShowcaseProvider for GitHubAggregator {
    async fn fetch_user(&self, handle: &str) -> Result<UserProfile, FetcherError> {
        let user: UserProfile = self.fetch_as(&Endpoint::user(handle)).await?;
        info!("Fetched {user}");

        Ok(user)
    }

    async fn fetch_repositories(&self, handle: &str) -> Result<Vec<Repository>, FetcherError> {
        let repositories: Vec<Repository> =
            self.fetch_as(&Endpoint::repositories(handle)).await?;
        let total_fetched = repositories.len();
        let repositories = showcased_repositories(repositories);
        info!(
            "Fetched {total_fetched} repositories for {handle}, showcasing {}",
            repositories.len()
        );

        Ok(repositories)
    }

    async fn fetch_languages(
        &self,
        handle: &str,
        repositories: &[Repository],
    ) -> Result<Vec<LanguageStat>, FetcherError> {
        if repositories.is_empty() {
            return Ok(vec![]);
        }

        let mut tasks = Vec::new();
        for repository in repositories.iter().take(LANGUAGE_SAMPLE_SIZE) {
            let fetcher_clone = Arc::clone(&self.fetcher);
            let endpoint = Endpoint::languages(handle, repository.repository_name());
            tasks.push(tokio::spawn(async move {
                Self::fetch_repository_languages(fetcher_clone, endpoint).await
            }));
        }

        let mut breakdowns = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(breakdown) => breakdowns.push(breakdown),
                Err(e) => warn!("Language fetch task failed: {e}"),
            }
        }
        let stats = LanguageStat::aggregate(breakdowns, TOP_LANGUAGES);
        info!(
            "Aggregated {} languages over {} repositories of {handle}",
            stats.len(),
            repositories.len().min(LANGUAGE_SAMPLE_SIZE)
        );

        Ok(stats)
    }
}
