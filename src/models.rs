use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ContentError;

/// Characters left as-is in a slug path segment.
const SLUG_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Front matter of the markdown pages kept in the content directory.
#[derive(Deserialize, Debug, Clone)]
pub struct FrontMatter {
    pub title: String,
}

/// A validated post. Required fields are guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub published_at: DateTime<Utc>,
    /// Category code exactly as authored; may not be a known code.
    pub category: String,
    pub cover_image: Option<AssetRef>,
    pub body: Vec<Block>,
    pub artist_credit: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
}

impl Post {
    /// Validates one raw document from the content service.
    pub fn from_document(doc: Value) -> Result<Post, ContentError> {
        let id_hint = doc
            .get("_id")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();
        let raw: RawPost =
            serde_json::from_value(doc).map_err(|e| ContentError::InvalidDocument {
                id: id_hint.clone(),
                reason: e.to_string(),
            })?;
        raw.validate(id_hint)
    }

    /// Site-relative link to the post page.
    pub fn path(&self) -> String {
        format!("/post/{}", utf8_percent_encode(&self.slug, SLUG_SEGMENT))
    }

    pub fn display_date(&self) -> String {
        self.published_at.format("%-d/%-m/%Y").to_string()
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "spacer")]
    Spacer(Spacer),
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default, rename = "listItem")]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default, rename = "markDefs", deserialize_with = "nullable")]
    pub mark_defs: Vec<MarkDef>,
    #[serde(default, deserialize_with = "nullable")]
    pub children: Vec<Span>,
}

impl TextBlock {
    /// Child texts joined by a single space. Spans without text count as empty.
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .map(|span| span.text.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Span {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub marks: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ImageBlock {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Spacer {
    #[serde(default)]
    pub height: Option<f64>,
}

impl Spacer {
    pub const DEFAULT_HEIGHT: f64 = 32.0;

    pub fn height(&self) -> f64 {
        self.height.unwrap_or(Self::DEFAULT_HEIGHT)
    }
}

#[derive(Deserialize, Debug)]
struct RawPost {
    #[serde(rename = "_id")]
    id: Option<String>,
    title: Option<String>,
    slug: Option<RawSlug>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    category: Option<String>,
    #[serde(rename = "coverImage")]
    cover_image: Option<RawImage>,
    #[serde(default, deserialize_with = "nullable")]
    body: Vec<Block>,
    #[serde(rename = "artistCredit")]
    artist_credit: Option<String>,
    #[serde(rename = "viewCount")]
    view_count: Option<u64>,
    #[serde(rename = "likeCount")]
    like_count: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct RawSlug {
    current: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawImage {
    asset: Option<AssetRef>,
}

impl RawPost {
    fn validate(self, id_hint: String) -> Result<Post, ContentError> {
        let invalid = |reason: &str| ContentError::InvalidDocument {
            id: id_hint.clone(),
            reason: reason.to_string(),
        };

        let id = self.id.ok_or_else(|| invalid("missing _id"))?;
        let title = self.title.ok_or_else(|| invalid("missing title"))?;
        let slug = self
            .slug
            .and_then(|s| s.current)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("missing slug.current"))?;
        let raw_date = self
            .published_at
            .ok_or_else(|| invalid("missing publishedAt"))?;
        let published_at = DateTime::parse_from_rfc3339(&raw_date)
            .map_err(|e| invalid(&format!("bad publishedAt `{raw_date}`: {e}")))?
            .with_timezone(&Utc);

        Ok(Post {
            id,
            title,
            slug,
            published_at,
            category: self.category.unwrap_or_default(),
            cover_image: self.cover_image.and_then(|img| img.asset),
            body: self.body,
            artist_credit: self.artist_credit.filter(|a| !a.is_empty()),
            view_count: self.view_count,
            like_count: self.like_count,
        })
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The fixed set of category codes a post may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Poem,
    ShortStory,
    LongStory,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Poem, Category::ShortStory, Category::LongStory];

    pub fn code(self) -> &'static str {
        match self {
            Category::Poem => "poem",
            Category::ShortStory => "shortStory",
            Category::LongStory => "longStory",
        }
    }
}

/// Display labels keyed by category code, including the synthetic `all`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryLabels {
    entries: &'static [(&'static str, &'static str)],
}

impl CategoryLabels {
    pub const TAMIL: CategoryLabels = CategoryLabels {
        entries: &[
            ("all", "அனைத்தும்"),
            ("poem", "கவிதை"),
            ("shortStory", "குறுநாவல்"),
            ("longStory", "நீண்ட கதை"),
        ],
    };

    /// Exact-key lookup. Codes that differ in case or spacing have no label.
    pub fn label(&self, code: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == code)
            .map(|(_, label)| *label)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn paragraph(texts: &[&str]) -> Block {
        Block::Text(TextBlock {
            style: Some("normal".into()),
            children: texts
                .iter()
                .map(|t| Span {
                    text: Some(t.to_string()),
                    marks: vec![],
                })
                .collect(),
            ..TextBlock::default()
        })
    }

    pub(crate) fn post(id: &str, day: u32, category: &str) -> Post {
        Post {
            id: id.to_string(),
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            published_at: DateTime::parse_from_rfc3339(&format!("2024-05-{day:02}T08:00:00Z"))
                .unwrap()
                .with_timezone(&Utc),
            category: category.to_string(),
            cover_image: None,
            body: vec![paragraph(&["body of", id])],
            artist_credit: None,
            view_count: None,
            like_count: None,
        }
    }

    #[test]
    fn decodes_a_full_document() {
        let doc = json!({
            "_id": "abc",
            "title": "மழை",
            "slug": { "_type": "slug", "current": "mazhai" },
            "publishedAt": "2024-06-01T10:30:00+05:30",
            "category": "poem",
            "coverImage": { "_type": "image", "asset": { "_ref": "image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg" } },
            "artistCredit": "ரவி",
            "viewCount": 12,
            "body": [
                { "_type": "spacer", "height": 48 },
                { "_type": "block", "_key": "k1", "style": "normal", "markDefs": [],
                  "children": [ { "_type": "span", "text": "முதல்", "marks": [] } ] },
                { "_type": "image", "asset": { "_ref": "image-a-1x1-png" }, "alt": "x" },
                { "_type": "youtube", "url": "https://example.com" }
            ]
        });

        let post = Post::from_document(doc).unwrap();
        assert_eq!(post.slug, "mazhai");
        assert_eq!(post.published_at.to_rfc3339(), "2024-06-01T05:00:00+00:00");
        assert_eq!(post.display_date(), "1/6/2024");
        assert_eq!(post.view_count, Some(12));
        assert_eq!(post.like_count, None);
        assert!(post.cover_image.is_some());
        assert_eq!(post.body.len(), 4);
        assert_eq!(post.body[0], Block::Spacer(Spacer { height: Some(48.0) }));
        assert!(matches!(post.body[1], Block::Text(_)));
        assert_eq!(post.body[3], Block::Unknown);
    }

    #[test]
    fn null_children_and_missing_body_are_empty() {
        let doc = json!({
            "_id": "x",
            "title": "t",
            "slug": { "current": "t" },
            "publishedAt": "2024-01-01T00:00:00Z",
            "body": [ { "_type": "block", "children": null } ]
        });
        let post = Post::from_document(doc).unwrap();
        assert_eq!(post.category, "");
        match &post.body[0] {
            Block::Text(block) => assert!(block.children.is_empty()),
            other => panic!("unexpected block {other:?}"),
        }

        let doc = json!({
            "_id": "y",
            "title": "t",
            "slug": { "current": "t" },
            "publishedAt": "2024-01-01T00:00:00Z",
            "body": null
        });
        assert!(Post::from_document(doc).unwrap().body.is_empty());
    }

    #[test]
    fn rejects_documents_missing_required_fields() {
        let doc = json!({ "_id": "no-slug", "title": "t", "publishedAt": "2024-01-01T00:00:00Z" });
        match Post::from_document(doc) {
            Err(ContentError::InvalidDocument { id, reason }) => {
                assert_eq!(id, "no-slug");
                assert!(reason.contains("slug"));
            }
            other => panic!("expected invalid document, got {other:?}"),
        }

        let doc = json!({ "_id": "bad-date", "title": "t", "slug": { "current": "s" }, "publishedAt": "yesterday" });
        assert!(matches!(
            Post::from_document(doc),
            Err(ContentError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn path_percent_encodes_the_slug() {
        let mut p = post("1", 1, "poem");
        assert_eq!(p.path(), "/post/post-1");
        p.slug = "நிலா/இரவு?x".into();
        assert_eq!(
            p.path(),
            "/post/%E0%AE%A8%E0%AE%BF%E0%AE%B2%E0%AE%BE%2F%E0%AE%87%E0%AE%B0%E0%AE%B5%E0%AF%81%3Fx"
        );
    }

    #[test]
    fn plain_text_joins_children_with_spaces() {
        let block = TextBlock {
            children: vec![
                Span { text: Some("a".into()), marks: vec![] },
                Span { text: None, marks: vec![] },
                Span { text: Some("b".into()), marks: vec![] },
            ],
            ..TextBlock::default()
        };
        assert_eq!(block.plain_text(), "a  b");
    }

    #[test]
    fn labels_use_exact_codes() {
        let labels = CategoryLabels::TAMIL;
        assert_eq!(labels.label("shortStory"), Some("குறுநாவல்"));
        assert_eq!(labels.label("all"), Some("அனைத்தும்"));
        assert_eq!(labels.label("Poem"), None);
        assert_eq!(labels.label("longStory"), Some("நீண்ட கதை"));
    }
}
