use crate::{BlogError, BlogPost, BlogPostDraft, Session};

/// A trait for the remote table storing blog posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BlogPostStore: Sync + Send {
    /// Lists published posts, newest first, optionally restricted to those carrying `tag`.
    async fn list_published(&self, tag: Option<String>) -> Result<Vec<BlogPost>, BlogError>;

    /// Finds a published post by its slug.
    async fn find_published(&self, slug: &str) -> Result<Option<BlogPost>, BlogError>;

    /// Lists every post of an author, newest first.
    async fn list_by_author(
        &self,
        session: &Session,
        author_id: &str,
    ) -> Result<Vec<BlogPost>, BlogError>;

    /// Inserts a post on behalf of an author.
    async fn insert(
        &self,
        session: &Session,
        author_id: &str,
        draft: &BlogPostDraft,
    ) -> Result<BlogPost, BlogError>;

    /// Replaces the editable fields of a post.
    async fn update(
        &self,
        session: &Session,
        id: &str,
        draft: &BlogPostDraft,
    ) -> Result<BlogPost, BlogError>;

    /// Deletes a post.
    async fn delete(&self, session: &Session, id: &str) -> Result<(), BlogError>;
}
