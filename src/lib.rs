//! Showcase data of a GitHub user (profile, projects and language statistics) served through a
//! time-bounded single-flight cache, and a client for the companion blog post store.

mod infrastructure;
mod interface;
mod model;

pub use infrastructure::*;
pub use interface::*;
pub use model::*;
