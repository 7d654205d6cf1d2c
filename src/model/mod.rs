mod blog;
mod entities;
mod error;
mod languages;
mod policy;
mod request;
mod response;

pub use blog::*;
pub use entities::*;
pub use error::*;
pub use languages::*;
pub use policy::*;
pub use request::*;
pub use response::*;
