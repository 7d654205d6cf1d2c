use std::time::Duration;

use anyhow::Context;
use log::{debug, warn};
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;

use crate::{ApiFetcher, Endpoint, FetcherError, FetcherRateLimit, StdResult};

/// The REST production endpoint for GitHub.
pub const GITHUB_API_ENDPOINT: &str = "https://api.github.com";

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Fetches JSON resources from the GitHub REST API over HTTP.
pub struct HttpFetcher {
    client: Client,
    endpoint: String,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher` instance for the given API root.
    ///
    /// Requests are authenticated when a token is provided, anonymous otherwise. A request still
    /// pending after `timeout` fails with a network error.
    pub fn try_new(endpoint: &str, token: Option<&str>, timeout: Duration) -> StdResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("github-showcase"));
        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .with_context(|| "Invalid GitHub API token")?,
            );
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .with_context(|| "Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client reading the optional token from the `GITHUB_API_TOKEN` environment variable.
    pub fn try_from_env(endpoint: &str, timeout: Duration) -> StdResult<Self> {
        let token = std::env::var("GITHUB_API_TOKEN").ok();

        Self::try_new(endpoint, token.as_deref(), timeout)
    }

    fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.endpoint, endpoint.path())
    }

    fn check_status(
        status: StatusCode,
        headers: &HeaderMap,
        endpoint: &Endpoint,
    ) -> Result<(), FetcherError> {
        if status.is_success() {
            return Ok(());
        }
        if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) {
            if let Some(rate_limit) =
                FetcherRateLimit::from_headers(headers).filter(FetcherRateLimit::is_exceeded)
            {
                warn!("Fetcher rate limit exceeded for {endpoint}: {rate_limit}");
                return Err(FetcherError::RateLimited {
                    reset_at: rate_limit.reset_at,
                });
            }
        }

        Err(FetcherError::Network(format!(
            "{endpoint} returned HTTP {status}"
        )))
    }
}

#[async_trait::async_trait]
impl ApiFetcher for HttpFetcher {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, FetcherError> {
        debug!("Fetching {endpoint}");
        let response = self.client.get(self.url(endpoint)).send().await?;
        Self::check_status(response.status(), response.headers(), endpoint)?;

        Ok(response.json::<Value>().await?)
    }
}
