//! Client for the Sanity content API.

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SiteConfig;
use crate::error::ContentError;
use crate::models::Post;

const POST_FIELDS: &str = "{
  _id,
  title,
  slug,
  publishedAt,
  category,
  coverImage,
  body,
  artistCredit,
  viewCount,
  likeCount
}";

pub fn posts_query() -> String {
    format!(r#"*[_type == "post"] | order(publishedAt desc) {POST_FIELDS}"#)
}

pub fn post_by_slug_query() -> String {
    format!(r#"*[_type == "post" && slug.current == $slug][0] {POST_FIELDS}"#)
}

/// Where posts come from. Handlers only see this trait.
pub trait ContentSource: Send + Sync {
    /// All posts, newest first.
    fn fetch_posts(&self) -> BoxFuture<'_, Result<Vec<Post>, ContentError>>;

    /// The post whose slug is `slug`; [`ContentError::NotFound`] if none.
    fn fetch_post<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Result<Post, ContentError>>;
}

#[derive(Deserialize, Debug)]
struct QueryResponse<T> {
    result: T,
}

pub struct SanityClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SanityClient {
    pub fn new(config: &SiteConfig) -> Self {
        SanityClient {
            http: reqwest::Client::new(),
            endpoint: query_endpoint(config),
        }
    }

    fn request(&self, query: &str, params: &[(&str, String)]) -> reqwest::RequestBuilder {
        let mut pairs: Vec<(&str, &str)> = vec![("query", query)];
        pairs.extend(params.iter().map(|(k, v)| (*k, v.as_str())));
        self.http.get(&self.endpoint).query(&pairs)
    }

    async fn query<T>(&self, query: &str, params: &[(&str, String)]) -> Result<T, ContentError>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!(endpoint = %self.endpoint, "querying content service");
        let response = self.request(query, params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, body)
    }
}

/// GROQ parameters are bound as JSON literals, so a slug goes over the wire
/// as `$slug="..."`.
fn slug_params(slug: &str) -> Result<Vec<(&'static str, String)>, ContentError> {
    Ok(vec![("$slug", serde_json::to_string(slug)?)])
}

fn decode_response<T>(status: reqwest::StatusCode, body: String) -> Result<T, ContentError>
where
    T: for<'de> Deserialize<'de>,
{
    if !status.is_success() {
        return Err(ContentError::Status { status, body });
    }
    let envelope: QueryResponse<T> = serde_json::from_str(&body)?;
    Ok(envelope.result)
}

impl ContentSource for SanityClient {
    fn fetch_posts(&self) -> BoxFuture<'_, Result<Vec<Post>, ContentError>> {
        Box::pin(async move {
            let docs: Option<Vec<Value>> = self.query(&posts_query(), &[]).await?;
            Ok(posts_from_documents(docs.unwrap_or_default()))
        })
    }

    fn fetch_post<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Result<Post, ContentError>> {
        Box::pin(async move {
            let params = slug_params(slug)?;
            let doc: Option<Value> = self.query(&post_by_slug_query(), &params).await?;
            post_from_result(slug, doc)
        })
    }
}

pub fn query_endpoint(config: &SiteConfig) -> String {
    let host = if config.use_cdn {
        "apicdn.sanity.io"
    } else {
        "api.sanity.io"
    };
    let version = config.api_version.trim_start_matches('v');
    format!(
        "https://{}.{host}/v{version}/data/query/{}",
        config.project_id, config.dataset
    )
}

/// Validates each document, dropping the ones that fail.
pub fn posts_from_documents(docs: Vec<Value>) -> Vec<Post> {
    docs.into_iter()
        .filter_map(|doc| match Post::from_document(doc) {
            Ok(post) => Some(post),
            Err(e) => {
                warn!("Skipping post: {}", e);
                None
            }
        })
        .collect()
}

pub fn post_from_result(slug: &str, doc: Option<Value>) -> Result<Post, ContentError> {
    match doc {
        Some(Value::Null) | None => Err(ContentError::NotFound {
            slug: slug.to_string(),
        }),
        Some(doc) => Post::from_document(doc),
    }
}
