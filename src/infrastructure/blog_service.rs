use std::sync::Arc;

use log::{info, warn};

use crate::{
    BlogError, BlogPost, BlogPostDraft, BlogPostStore, RoleChecker, Session, TagCount, count_tags,
};

/// Public reads and admin author operations over a blog post store.
pub struct BlogService {
    store: Arc<dyn BlogPostStore>,
    roles: Arc<dyn RoleChecker>,
    session: Option<Session>,
}

impl BlogService {
    /// Creates a new `BlogService` instance, authenticated when a session is given.
    pub fn new(
        store: Arc<dyn BlogPostStore>,
        roles: Arc<dyn RoleChecker>,
        session: Option<Session>,
    ) -> Self {
        Self {
            store,
            roles,
            session,
        }
    }

    /// The session of an authenticated admin.
    async fn admin_session(&self) -> Result<&Session, BlogError> {
        let session = self.session.as_ref().ok_or(BlogError::NotAuthenticated)?;
        if !self.roles.is_admin(session).await? {
            warn!("User {} is not an admin", session.user_id);
            return Err(BlogError::NotAuthorized);
        }

        Ok(session)
    }

    /// Whether the service acts on behalf of an authenticated user.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the service acts on behalf of an authenticated admin.
    pub async fn is_admin(&self) -> Result<bool, BlogError> {
        match &self.session {
            Some(session) => self.roles.is_admin(session).await,
            None => Ok(false),
        }
    }

    /// Lists published posts, newest first, optionally restricted to a tag.
    pub async fn published_posts(&self, tag: Option<&str>) -> Result<Vec<BlogPost>, BlogError> {
        self.store.list_published(tag.map(str::to_string)).await
    }

    /// Finds a published post by its slug.
    pub async fn published_post(&self, slug: &str) -> Result<Option<BlogPost>, BlogError> {
        self.store.find_published(slug).await
    }

    /// Counts the tags of the published posts, most used first.
    pub async fn tags(&self) -> Result<Vec<TagCount>, BlogError> {
        let posts = self.store.list_published(None).await?;

        Ok(count_tags(&posts))
    }

    /// Lists the posts of the authenticated admin, drafts included.
    pub async fn my_posts(&self) -> Result<Vec<BlogPost>, BlogError> {
        let session = self.admin_session().await?;

        self.store.list_by_author(session, &session.user_id).await
    }

    /// Validates and creates a post authored by the authenticated admin.
    pub async fn create(&self, draft: BlogPostDraft) -> Result<BlogPost, BlogError> {
        let session = self.admin_session().await?;
        let draft = draft.validate()?;
        let post = self.store.insert(session, &session.user_id, &draft).await?;
        info!("Created {post}");

        Ok(post)
    }

    /// Validates and replaces the editable fields of a post.
    pub async fn update(&self, id: &str, draft: BlogPostDraft) -> Result<BlogPost, BlogError> {
        let session = self.admin_session().await?;
        let draft = draft.validate()?;
        let post = self.store.update(session, id, &draft).await?;
        info!("Updated {post}");

        Ok(post)
    }

    /// Deletes a post.
    pub async fn delete(&self, id: &str) -> Result<(), BlogError> {
        let session = self.admin_session().await?;
        self.store.delete(session, id).await?;
        info!("Deleted blog post {id}");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{MockBlogPostStore, MockRoleChecker};

    use super::*;

    fn draft() -> BlogPostDraft {
        BlogPostDraft {
            title: " Hello ".to_string(),
            slug: "hello".to_string(),
            content: "World".to_string(),
            excerpt: None,
            tags: vec!["rust".to_string()],
            published: true,
        }
    }

    fn session() -> Session {
        Session::new("author-1", "token")
    }

    fn roles(is_admin: bool) -> Arc<MockRoleChecker> {
        let mut roles = MockRoleChecker::new();
        roles
            .expect_is_admin()
            .withf(|session| session.user_id == "author-1")
            .returning(move |_| Ok(is_admin));

        Arc::new(roles)
    }

    fn no_roles() -> Arc<MockRoleChecker> {
        let mut roles = MockRoleChecker::new();
        roles.expect_is_admin().never();

        Arc::new(roles)
    }

    #[tokio::test]
    async fn create_stamps_author_and_trims_draft() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store
                .expect_insert()
                .withf(|session, author_id, draft| {
                    session.user_id == "author-1" && author_id == "author-1" && draft.title == "Hello"
                })
                .returning(|_, _, _| Ok(BlogPost::dummy("1", &["rust"], true)))
                .times(1);

            store
        };
        let service = BlogService::new(Arc::new(store), roles(true), Some(session()));

        let post = service.create(draft()).await.unwrap();

        assert_eq!("1", post.id);
    }

    #[tokio::test]
    async fn create_requires_a_session() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store.expect_insert().never();

            store
        };
        let service = BlogService::new(Arc::new(store), no_roles(), None);

        let error = service
            .create(draft())
            .await
            .expect_err("Expected an authentication error");

        assert!(matches!(error, BlogError::NotAuthenticated));
    }

    #[tokio::test]
    async fn author_operations_are_rejected_for_non_admins() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store.expect_list_by_author().never();
            store.expect_insert().never();
            store.expect_update().never();
            store.expect_delete().never();

            store
        };
        let service = BlogService::new(Arc::new(store), roles(false), Some(session()));

        let mine = service.my_posts().await.expect_err("Expected a role error");
        let created = service.create(draft()).await.expect_err("Expected a role error");
        let updated = service
            .update("1", draft())
            .await
            .expect_err("Expected a role error");
        let deleted = service.delete("1").await.expect_err("Expected a role error");

        assert!(matches!(mine, BlogError::NotAuthorized));
        assert!(matches!(created, BlogError::NotAuthorized));
        assert!(matches!(updated, BlogError::NotAuthorized));
        assert!(matches!(deleted, BlogError::NotAuthorized));
    }

    #[tokio::test]
    async fn role_check_failure_is_propagated() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store.expect_insert().never();

            store
        };
        let roles = {
            let mut roles = MockRoleChecker::new();
            roles
                .expect_is_admin()
                .returning(|_| Err(BlogError::Store("HTTP 503".to_string())))
                .times(1);

            roles
        };
        let service = BlogService::new(Arc::new(store), Arc::new(roles), Some(session()));

        let error = service
            .create(draft())
            .await
            .expect_err("Expected a store error");

        assert!(matches!(error, BlogError::Store(_)));
    }

    #[tokio::test]
    async fn is_admin_without_session_skips_the_role_check() {
        let service = BlogService::new(Arc::new(MockBlogPostStore::new()), no_roles(), None);

        assert!(!service.is_admin().await.unwrap());
        assert!(!service.is_authenticated());
    }

    #[tokio::test]
    async fn is_admin_asks_the_role_checker() {
        let service =
            BlogService::new(Arc::new(MockBlogPostStore::new()), roles(true), Some(session()));

        assert!(service.is_admin().await.unwrap());
        assert!(service.is_authenticated());
    }

    #[tokio::test]
    async fn update_rejects_invalid_draft_before_reaching_the_store() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store.expect_update().never();

            store
        };
        let service = BlogService::new(Arc::new(store), roles(true), Some(session()));
        let draft = BlogPostDraft {
            content: "   ".to_string(),
            ..draft()
        };

        let error = service
            .update("1", draft)
            .await
            .expect_err("Expected a validation error");

        assert!(matches!(error, BlogError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_requires_a_session() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store.expect_delete().never();

            store
        };
        let service = BlogService::new(Arc::new(store), no_roles(), None);

        let error = service
            .delete("1")
            .await
            .expect_err("Expected an authentication error");

        assert!(matches!(error, BlogError::NotAuthenticated));
    }

    #[tokio::test]
    async fn my_posts_lists_posts_of_the_session_user() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store
                .expect_list_by_author()
                .withf(|_, author_id| author_id == "author-1")
                .returning(|_, _| Ok(vec![BlogPost::dummy("1", &[], false)]))
                .times(1);

            store
        };
        let service = BlogService::new(Arc::new(store), roles(true), Some(session()));

        let posts = service.my_posts().await.unwrap();

        assert_eq!(1, posts.len());
    }

    #[tokio::test]
    async fn tags_counts_published_posts() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store
                .expect_list_published()
                .withf(|tag| tag.is_none())
                .returning(|_| {
                    Ok(vec![
                        BlogPost::dummy("1", &["rust", "async"], true),
                        BlogPost::dummy("2", &["rust"], true),
                    ])
                })
                .times(1);

            store
        };
        let service = BlogService::new(Arc::new(store), no_roles(), None);

        let tags = service.tags().await.unwrap();

        assert_eq!(
            vec![
                TagCount {
                    tag: "rust".to_string(),
                    count: 2
                },
                TagCount {
                    tag: "async".to_string(),
                    count: 1
                },
            ],
            tags
        );
    }

    #[tokio::test]
    async fn published_posts_passes_the_tag_filter() {
        let store = {
            let mut store = MockBlogPostStore::new();
            store
                .expect_list_published()
                .withf(|tag| tag.as_deref() == Some("rust"))
                .returning(|_| Ok(vec![]))
                .times(1);

            store
        };
        let service = BlogService::new(Arc::new(store), no_roles(), None);

        let posts = service.published_posts(Some("rust")).await.unwrap();

        assert!(posts.is_empty());
    }
}
