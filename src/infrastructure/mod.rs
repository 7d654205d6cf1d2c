mod aggregator_github;
mod blog_postgrest;
mod blog_service;
mod cache;
mod fetcher_http;
mod showcase_cache;
mod showcase_loader;
mod showcase_retrier;

pub use aggregator_github::*;
pub use blog_postgrest::*;
pub use blog_service::*;
pub use cache::*;
pub use fetcher_http::*;
pub use showcase_cache::*;
pub use showcase_loader::*;
pub use showcase_retrier::*;
