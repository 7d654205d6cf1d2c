mod blog_store;
mod fetcher;
mod role_checker;
mod showcase;

pub use blog_store::*;
pub use fetcher::*;
pub use role_checker::*;
pub use showcase::*;
