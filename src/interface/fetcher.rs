use serde_json::Value;

use crate::{Endpoint, FetcherError};

/// A trait for reading JSON resources from the GitHub REST API.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ApiFetcher: Sync + Send {
    /// Performs a GET request on the endpoint and returns its parsed JSON body.
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, FetcherError>;
}
