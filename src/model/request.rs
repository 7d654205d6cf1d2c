use std::{collections::BTreeSet, fmt::Display};

use serde::Serialize;

use super::{Repository, RepositoryName};

/// The maximum number of repositories listed for a user, in a single page.
pub const MAX_REPOSITORIES_PER_PAGE: u16 = 100;

/// A read-only request to the GitHub REST API
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Hash)]
pub enum Endpoint {
    /// The public profile of a user.
    User {
        /// The login handle.
        handle: String,
    },

    /// The repositories of a user, most recently updated first.
    Repositories {
        /// The login handle.
        handle: String,
        /// The page size.
        per_page: u16,
    },

    /// The language byte counts of a repository.
    Languages {
        /// The owner login handle.
        handle: String,
        /// The repository name.
        repository: RepositoryName,
    },
}

impl Endpoint {
    /// Creates a request for the profile of `handle`.
    pub fn user(handle: &str) -> Self {
        Self::User {
            handle: handle.to_string(),
        }
    }

    /// Creates a request for the first page of repositories of `handle`.
    pub fn repositories(handle: &str) -> Self {
        Self::Repositories {
            handle: handle.to_string(),
            per_page: MAX_REPOSITORIES_PER_PAGE,
        }
    }

    /// Creates a request for the languages of the repository `repository` owned by `handle`.
    pub fn languages(handle: &str, repository: &RepositoryName) -> Self {
        Self::Languages {
            handle: handle.to_string(),
            repository: repository.to_owned(),
        }
    }

    /// The path and query of the request, relative to the API root.
    pub fn path(&self) -> String {
        match self {
            Endpoint::User { handle } => format!("/users/{handle}"),
            Endpoint::Repositories { handle, per_page } => {
                format!("/users/{handle}/repos?sort=updated&per_page={per_page}")
            }
            Endpoint::Languages { handle, repository } => {
                format!("/repos/{handle}/{repository}/languages")
            }
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GET {}", self.path())
    }
}

/// The logical identity of a cached query
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum CacheKey {
    /// The profile of a user.
    User(String),

    /// The showcased repositories of a user.
    Repositories(String),

    /// The language statistics over a set of repositories of a user.
    Languages {
        /// The owner login handle.
        handle: String,
        /// The names of the sampled repositories.
        repositories: BTreeSet<RepositoryName>,
    },
}

impl CacheKey {
    /// Creates the key of the language statistics over `repositories`.
    pub fn languages(handle: &str, repositories: &[Repository]) -> Self {
        Self::Languages {
            handle: handle.to_string(),
            repositories: repositories
                .iter()
                .map(|repository| repository.repository_name().to_owned())
                .collect(),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::User(handle) => write!(f, "github-user:{handle}"),
            CacheKey::Repositories(handle) => write!(f, "github-repos:{handle}"),
            CacheKey::Languages {
                handle,
                repositories,
            } => {
                let names = repositories
                    .iter()
                    .map(|name| name.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "github-languages:{handle}:[{names}]")
            }
        }
    }
}
