use std::{fmt, sync::Arc, time::Duration};

use anyhow::{Context, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;

use github_showcase::{
    BlogPostDraft, BlogService, DEFAULT_REQUEST_TIMEOUT, GITHUB_API_ENDPOINT, GitHubAggregator, HttpFetcher,
    PostgrestBlogStore, RetryPolicy, Session, ShowcaseCache, ShowcaseProvider, ShowcaseRetrier,
    StdResult, load_showcase, parse_tags, slugify,
};

/// Command line arguments for the GitHub showcase
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the profile, projects and language statistics of a GitHub user
    Showcase(ShowcaseArgs),

    /// Read or edit blog posts
    Blog(BlogArgs),
}

#[derive(ClapArgs, Debug)]
struct ShowcaseArgs {
    /// GitHub login to showcase
    #[arg(long, env = "GITHUB_HANDLE")]
    handle: String,

    /// GitHub REST API endpoint
    #[arg(long, env = "GITHUB_API_ENDPOINT", default_value = GITHUB_API_ENDPOINT)]
    api_endpoint: String,

    /// Staleness window of cached queries, in minutes
    #[arg(long, default_value_t = 10)]
    staleness_minutes: u64,

    /// Maximum number of retries after a network failure
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Base delay of the exponential retry backoff, in milliseconds
    #[arg(long, default_value_t = 500)]
    retry_base_delay_ms: u64,

    /// Time budget of a single GitHub request, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    request_timeout_secs: u64,

    /// Only list projects of this primary language, ignoring case ("All" lists every project)
    #[arg(short, long)]
    language: Option<String>,
}

#[derive(ClapArgs)]
struct BlogArgs {
    /// Blog store project endpoint (e.g., https://project.supabase.co)
    #[arg(long, env = "BLOG_STORE_URL")]
    blog_endpoint: String,

    /// Blog store public api key
    #[arg(long, env = "BLOG_STORE_API_KEY")]
    blog_api_key: String,

    /// Session access token, required for author operations
    #[arg(long, env = "BLOG_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// Identifier of the authenticated author
    #[arg(long, env = "BLOG_AUTHOR_ID")]
    author_id: Option<String>,

    #[command(subcommand)]
    command: BlogCommand,
}

impl fmt::Debug for BlogArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");

        f.debug_struct("BlogArgs")
            .field("blog_endpoint", &self.blog_endpoint)
            .field("blog_api_key", &"<redacted>")
            .field("access_token", &redacted(&self.access_token))
            .field("author_id", &self.author_id)
            .field("command", &self.command)
            .finish()
    }
}

#[derive(Subcommand, Debug)]
enum BlogCommand {
    /// List published posts
    List {
        /// Only list posts carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show a published post
    Show {
        /// The post slug
        slug: String,
    },

    /// Count the tags of published posts
    Tags,

    /// List the posts of the authenticated author
    Mine,

    /// Print whether the session is authenticated and holds the admin role
    Status,

    /// Create a post
    Create(DraftArgs),

    /// Update a post
    Update {
        /// The post identifier
        id: String,

        #[command(flatten)]
        draft: DraftArgs,
    },

    /// Delete a post
    Delete {
        /// The post identifier
        id: String,
    },
}

#[derive(ClapArgs, Debug)]
struct DraftArgs {
    /// The post title
    #[arg(long)]
    title: String,

    /// The post slug, derived from the title when omitted
    #[arg(long)]
    slug: Option<String>,

    /// The post content, in markdown
    #[arg(long)]
    content: String,

    /// A short excerpt
    #[arg(long)]
    excerpt: Option<String>,

    /// Comma separated tags
    #[arg(long, default_value = "")]
    tags: String,

    /// Publish the post
    #[arg(long)]
    published: bool,
}

impl From<DraftArgs> for BlogPostDraft {
    fn from(args: DraftArgs) -> Self {
        Self {
            slug: args.slug.unwrap_or_else(|| slugify(&args.title)),
            title: args.title,
            content: args.content,
            excerpt: args.excerpt,
            tags: parse_tags(&args.tags),
            published: args.published,
        }
    }
}

#[tokio::main]
async fn main() -> StdResult<()> {
    env_logger::init();
    let args = Args::parse();
    debug!("Arguments: {args:?}");

    match args.command {
        Command::Showcase(args) => run_showcase(&args).await,
        Command::Blog(args) => run_blog(args).await,
    }
}

fn build_showcase_provider(args: &ShowcaseArgs) -> StdResult<Arc<dyn ShowcaseProvider>> {
    let fetcher = Arc::new(HttpFetcher::try_from_env(
        &args.api_endpoint,
        Duration::from_secs(args.request_timeout_secs),
    )?);
    let aggregator = Arc::new(GitHubAggregator::new(fetcher));
    let retrier = Arc::new(ShowcaseRetrier::new(
        aggregator,
        RetryPolicy::new(
            args.max_retries,
            Duration::from_millis(args.retry_base_delay_ms),
        ),
    ));

    Ok(Arc::new(ShowcaseCache::new(
        retrier,
        Duration::from_secs(args.staleness_minutes * 60),
    )))
}

async fn run_showcase(args: &ShowcaseArgs) -> StdResult<()> {
    info!("Loading GitHub showcase of {}", args.handle);
    let provider = build_showcase_provider(args)?;
    let showcase = load_showcase(provider.as_ref(), &args.handle, args.language.as_deref())
        .await
        .with_context(|| format!("Failed to load the showcase of {}", args.handle))?;

    print_json(&showcase)
}

fn build_blog_service(args: &BlogArgs) -> StdResult<BlogService> {
    let store = Arc::new(PostgrestBlogStore::try_new(
        &args.blog_endpoint,
        &args.blog_api_key,
    )?);
    let session = match (&args.author_id, &args.access_token) {
        (Some(author_id), Some(access_token)) => Some(Session::new(author_id, access_token)),
        (None, None) => None,
        _ => {
            return Err(anyhow!(
                "Both an author id and an access token are required to authenticate"
            ));
        }
    };

    Ok(BlogService::new(store.clone(), store, session))
}

async fn run_blog(args: BlogArgs) -> StdResult<()> {
    let service = build_blog_service(&args)?;
    match args.command {
        BlogCommand::List { tag } => print_json(&service.published_posts(tag.as_deref()).await?),
        BlogCommand::Show { slug } => match service.published_post(&slug).await? {
            Some(post) => print_json(&post),
            None => Err(anyhow!("No published blog post /{slug}")),
        },
        BlogCommand::Tags => print_json(&service.tags().await?),
        BlogCommand::Mine => print_json(&service.my_posts().await?),
        BlogCommand::Status => print_json(&serde_json::json!({
            "authenticated": service.is_authenticated(),
            "admin": service.is_admin().await?,
        })),
        BlogCommand::Create(draft) => print_json(&service.create(draft.into()).await?),
        BlogCommand::Update { id, draft } => print_json(&service.update(&id, draft.into()).await?),
        BlogCommand::Delete { id } => {
            service.delete(&id).await?;
            info!("Blog post {id} deleted");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> StdResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
