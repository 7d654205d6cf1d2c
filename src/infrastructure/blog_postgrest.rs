use anyhow::Context;
use log::debug;
use reqwest::{Client, RequestBuilder, Response, header::HeaderValue};
use serde::Serialize;

use crate::{
    BlogError, BlogPost, BlogPostDraft, BlogPostStore, DEFAULT_REQUEST_TIMEOUT, RoleChecker,
    Session, StdResult,
};

const BLOG_POSTS_TABLE_PATH: &str = "/rest/v1/blog_posts";

const HAS_ROLE_FUNCTION_PATH: &str = "/rest/v1/rpc/has_role";

const ADMIN_ROLE: &str = "admin";

#[derive(Serialize, Debug)]
struct HasRoleArguments<'a> {
    #[serde(rename = "_user_id")]
    user_id: &'a str,
    #[serde(rename = "_role")]
    role: &'a str,
}

#[derive(Serialize, Debug)]
struct NewBlogPost<'a> {
    #[serde(flatten)]
    draft: &'a BlogPostDraft,
    author_id: &'a str,
}

/// A blog post store backed by a PostgREST table endpoint.
pub struct PostgrestBlogStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl PostgrestBlogStore {
    /// Creates a new `PostgrestBlogStore` instance for the given project endpoint and api key.
    pub fn try_new(endpoint: &str, api_key: &str) -> StdResult<Self> {
        HeaderValue::from_str(api_key).with_context(|| "Invalid blog store api key")?;
        let client = Client::builder()
            .user_agent("github-showcase")
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .with_context(|| "Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.endpoint, BLOG_POSTS_TABLE_PATH)
    }

    fn has_role_url(&self) -> String {
        format!("{}{}", self.endpoint, HAS_ROLE_FUNCTION_PATH)
    }

    /// Attaches the api key, and the session token when there is one.
    fn authorize(&self, request: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        let bearer = session
            .map(|session| session.access_token.as_str())
            .unwrap_or(&self.api_key);

        request
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn check_response(response: Response) -> Result<Response, BlogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();

        Err(BlogError::Store(format!("HTTP {status}: {body}")))
    }

    async fn fetch_posts(
        &self,
        request: RequestBuilder,
        session: Option<&Session>,
    ) -> Result<Vec<BlogPost>, BlogError> {
        let response = self.authorize(request, session).send().await?;
        let response = Self::check_response(response).await?;

        Ok(response.json::<Vec<BlogPost>>().await?)
    }

    async fn fetch_single_post(
        &self,
        request: RequestBuilder,
        session: &Session,
    ) -> Result<BlogPost, BlogError> {
        self.fetch_posts(request.header("Prefer", "return=representation"), Some(session))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BlogError::Store("No blog post returned".to_string()))
    }
}

/// A PostgREST filter matching arrays containing `tag`.
fn contains_tag_filter(tag: &str) -> String {
    format!("cs.{{\"{}\"}}", tag.replace('\\', "\\\\").replace('"', "\\\""))
}

#[async_trait::async_trait]
impl BlogPostStore for PostgrestBlogStore {
    async fn list_published(&self, tag: Option<String>) -> Result<Vec<BlogPost>, BlogError> {
        debug!("Listing published blog posts, tag={tag:?}");
        let mut query = vec![
            ("select", "*".to_string()),
            ("published", "eq.true".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(tag) = tag {
            query.push(("tags", contains_tag_filter(&tag)));
        }

        self.fetch_posts(self.client.get(self.url()).query(&query), None)
            .await
    }

    async fn find_published(&self, slug: &str) -> Result<Option<BlogPost>, BlogError> {
        debug!("Finding published blog post /{slug}");
        let query = [
            ("select", "*".to_string()),
            ("slug", format!("eq.{slug}")),
            ("published", "eq.true".to_string()),
            ("limit", "1".to_string()),
        ];
        let posts = self
            .fetch_posts(self.client.get(self.url()).query(&query), None)
            .await?;

        Ok(posts.into_iter().next())
    }

    async fn list_by_author(
        &self,
        session: &Session,
        author_id: &str,
    ) -> Result<Vec<BlogPost>, BlogError> {
        let query = [
            ("select", "*".to_string()),
            ("author_id", format!("eq.{author_id}")),
            ("order", "created_at.desc".to_string()),
        ];

        self.fetch_posts(self.client.get(self.url()).query(&query), Some(session))
            .await
    }

    async fn insert(
        &self,
        session: &Session,
        author_id: &str,
        draft: &BlogPostDraft,
    ) -> Result<BlogPost, BlogError> {
        let payload = NewBlogPost { draft, author_id };

        self.fetch_single_post(self.client.post(self.url()).json(&payload), session)
            .await
    }

    async fn update(
        &self,
        session: &Session,
        id: &str,
        draft: &BlogPostDraft,
    ) -> Result<BlogPost, BlogError> {
        let request = self
            .client
            .patch(self.url())
            .query(&[("id", format!("eq.{id}"))])
            .json(draft);

        self.fetch_single_post(request, session).await
    }

    async fn delete(&self, session: &Session, id: &str) -> Result<(), BlogError> {
        let request = self
            .client
            .delete(self.url())
            .query(&[("id", format!("eq.{id}"))]);
        let response = self.authorize(request, Some(session)).send().await?;
        Self::check_response(response).await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl RoleChecker for PostgrestBlogStore {
    async fn is_admin(&self, session: &Session) -> Result<bool, BlogError> {
        let arguments = HasRoleArguments {
            user_id: &session.user_id,
            role: ADMIN_ROLE,
        };
        let request = self.client.post(self.has_role_url()).json(&arguments);
        let response = self.authorize(request, Some(session)).send().await?;
        let is_admin = Self::check_response(response).await?.json::<bool>().await?;
        debug!("User {} admin role: {is_admin}", session.user_id);

        Ok(is_admin)
    }
}
