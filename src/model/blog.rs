use std::{collections::HashMap, fmt::Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BlogError;

/// A blog post record, as stored in the blog data store.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub reading_time: u32,
    pub published: bool,
    pub author_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// Creates a dummy `BlogPost` for testing purposes.
    #[cfg(test)]
    pub(crate) fn dummy(id: &str, tags: &[&str], published: bool) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            content: "Lorem ipsum".to_string(),
            excerpt: None,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            reading_time: 1,
            published,
            author_id: Some("author-1".to_string()),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    /// The excerpt, or the beginning of the content when there is none.
    pub fn summary(&self) -> String {
        match &self.excerpt {
            Some(excerpt) if !excerpt.is_empty() => excerpt.to_owned(),
            _ => format!("{}...", self.content.chars().take(150).collect::<String>()),
        }
    }
}

impl Display for BlogPost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BlogPost: /{} ({} min read, published={})",
            self.slug, self.reading_time, self.published
        )
    }
}

/// Author input for creating or updating a blog post.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogPostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
}

impl BlogPostDraft {
    /// Trims the draft and rejects it when the title, slug or content is empty.
    pub fn validate(self) -> Result<Self, BlogError> {
        let title = self.title.trim().to_string();
        let slug = self.slug.trim().to_string();
        let content = self.content.trim().to_string();
        if title.is_empty() || slug.is_empty() || content.is_empty() {
            return Err(BlogError::Validation(
                "Title, slug, and content are required".to_string(),
            ));
        }

        Ok(Self {
            title,
            slug,
            content,
            excerpt: self
                .excerpt
                .map(|excerpt| excerpt.trim().to_string())
                .filter(|excerpt| !excerpt.is_empty()),
            tags: self
                .tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            published: self.published,
        })
    }
}

/// The number of published posts carrying a tag.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

/// An authenticated session issued by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The authenticated user identifier.
    pub user_id: String,

    /// The bearer token of the session.
    pub access_token: String,
}

impl Session {
    /// Creates a new `Session` instance.
    pub fn new(user_id: &str, access_token: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            access_token: access_token.to_string(),
        }
    }
}

/// Derives a URL slug from a post title.
pub fn slugify(title: &str) -> String {
    let kept = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect::<String>();
    let mut slug = String::with_capacity(kept.len());
    for c in kept.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    slug
}

/// Splits a comma separated tag list, dropping blank entries.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Counts tag occurrences over the published posts, most used first.
pub fn count_tags(posts: &[BlogPost]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for post in posts.iter().filter(|post| post.published) {
        for tag in &post.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    let mut tag_counts = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect::<Vec<_>>();
    tag_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));

    tag_counts
}
