use crate::{BlogError, Session};

/// A trait for the role checks of the authentication service.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RoleChecker: Sync + Send {
    /// Whether the user of the session holds the admin role.
    async fn is_admin(&self, session: &Session) -> Result<bool, BlogError>;
}
