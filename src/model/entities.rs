use std::{fmt::Display, ops::Deref};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The name of a repository.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryName(pub String);

impl Deref for RepositoryName {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The number of stars a repository has.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct StarsCounter(pub u32);

impl Deref for StarsCounter {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for StarsCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public profile of a GitHub user.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// The login handle.
    pub login: String,

    /// The display name.
    pub name: Option<String>,

    /// The biography.
    pub bio: Option<String>,

    /// The number of public repositories.
    pub public_repos: u32,

    /// The number of followers.
    pub followers: u32,

    /// The number of followed users.
    #[serde(default)]
    pub following: u32,

    /// The profile page URL.
    pub html_url: String,

    /// The avatar image URL.
    #[serde(default)]
    pub avatar_url: Option<String>,

    /// The personal website.
    #[serde(default)]
    pub blog: Option<String>,

    /// The location.
    #[serde(default)]
    pub location: Option<String>,

    /// The company.
    #[serde(default)]
    pub company: Option<String>,
}

impl UserProfile {
    /// Creates a dummy `UserProfile` for testing purposes.
    #[cfg(test)]
    pub(crate) fn dummy(login: &str) -> Self {
        Self {
            login: login.to_string(),
            name: Some("Dummy User".to_string()),
            bio: None,
            public_repos: 3,
            followers: 7,
            following: 1,
            html_url: format!("https://github.com/{login}"),
            avatar_url: None,
            blog: None,
            location: None,
            company: None,
        }
    }
}

impl Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User: {}, Repositories: {}, Followers: {}",
            self.login, self.public_repos, self.followers
        )
    }
}

/// Metadata of a GitHub repository.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// The repository identifier.
    pub id: u64,

    /// The name of the repository.
    pub name: RepositoryName,

    /// The description.
    pub description: Option<String>,

    /// The repository page URL.
    pub html_url: String,

    /// The project homepage.
    #[serde(default)]
    pub homepage: Option<String>,

    /// The number of stars the repository has.
    pub stargazers_count: StarsCounter,

    /// The number of forks.
    pub forks_count: u32,

    /// The primary language.
    pub language: Option<String>,

    /// The topic tags, in source order.
    #[serde(default)]
    pub topics: Vec<String>,

    /// The last update time.
    pub updated_at: DateTime<Utc>,

    /// Whether the repository is a fork.
    pub fork: bool,
}

impl Repository {
    /// Creates a new `Repository` instance.
    pub fn new(id: u64, name: &str, stars: u32, fork: bool) -> Self {
        Self {
            id,
            name: RepositoryName(name.to_string()),
            description: None,
            html_url: String::new(),
            homepage: None,
            stargazers_count: StarsCounter(stars),
            forks_count: 0,
            language: None,
            topics: vec![],
            updated_at: DateTime::<Utc>::default(),
            fork,
        }
    }

    /// Retrieves the repository name.
    pub fn repository_name(&self) -> &RepositoryName {
        &self.name
    }

    /// Retrieves the total stars of the repository.
    pub fn total_stars(&self) -> &StarsCounter {
        &self.stargazers_count
    }

    /// Whether the repository is a fork.
    pub fn is_fork(&self) -> bool {
        self.fork
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repository: {}, Stars: {}, Fork: {}",
            self.name, self.stargazers_count, self.fork
        )
    }
}

/// An API rate limit, read from the response headers.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FetcherRateLimit {
    /// The maximum number of requests that can be made in a given time period.
    pub limit: i64,
    /// The remaining number of requests that can be made in the current time period.
    pub remaining: i64,
    /// The unix time (seconds) at which the rate limit will reset.
    pub reset_at: i64,
}

impl FetcherRateLimit {
    /// Reads the rate limit from `x-ratelimit-*` headers, if all of them are present.
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Option<Self> {
        let read = |name: &str| -> Option<i64> {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok())
        };

        Some(Self {
            limit: read("x-ratelimit-limit")?,
            remaining: read("x-ratelimit-remaining")?,
            reset_at: read("x-ratelimit-reset")?,
        })
    }

    /// Whether the request budget is exhausted.
    pub fn is_exceeded(&self) -> bool {
        self.remaining <= 0
    }
}

impl Display for FetcherRateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RateLimit: calls={}/{}, reset={}",
            self.limit - self.remaining,
            self.limit,
            self.reset_at
        )
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde_json::json;

    use super::*;

    #[test]
    fn repository_deserializes_from_rest_payload() {
        let repository: Repository = serde_json::from_value(json!({
            "id": 42,
            "name": "showcase",
            "description": null,
            "html_url": "https://github.com/octocat/showcase",
            "homepage": null,
            "stargazers_count": 12,
            "forks_count": 3,
            "language": "Rust",
            "topics": ["cli", "github"],
            "updated_at": "2025-01-01T00:00:00Z",
            "fork": false,
            "private": false
        }))
        .unwrap();

        assert_eq!(42, repository.id);
        assert_eq!("showcase", repository.repository_name().as_str());
        assert_eq!(12, **repository.total_stars());
        assert_eq!(vec!["cli", "github"], repository.topics);
        assert!(!repository.is_fork());
    }

    #[test]
    fn repository_topics_default_to_empty() {
        let repository: Repository = serde_json::from_value(json!({
            "id": 1,
            "name": "legacy",
            "description": "old",
            "html_url": "https://github.com/octocat/legacy",
            "stargazers_count": 0,
            "forks_count": 0,
            "language": null,
            "updated_at": "2020-05-01T10:00:00Z",
            "fork": true
        }))
        .unwrap();

        assert!(repository.topics.is_empty());
        assert!(repository.is_fork());
    }

    #[test]
    fn user_profile_deserializes_with_optional_fields_missing() {
        let user: UserProfile = serde_json::from_value(json!({
            "login": "octocat",
            "name": null,
            "bio": "Hello",
            "public_repos": 8,
            "followers": 100,
            "html_url": "https://github.com/octocat"
        }))
        .unwrap();

        assert_eq!("octocat", user.login);
        assert_eq!(None, user.name);
        assert_eq!(Some("Hello".to_string()), user.bio);
        assert_eq!(0, user.following);
    }

    #[test]
    fn rate_limit_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1735689600"));

        let rate_limit = FetcherRateLimit::from_headers(&headers).unwrap();

        assert_eq!(
            FetcherRateLimit {
                limit: 60,
                remaining: 0,
                reset_at: 1735689600,
            },
            rate_limit
        );
        assert!(rate_limit.is_exceeded());
    }

    #[test]
    fn rate_limit_from_incomplete_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("10"));

        assert_eq!(None, FetcherRateLimit::from_headers(&headers));
    }
}
