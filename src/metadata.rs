use htmlescape::encode_minimal;

use crate::image::{ImageSize, ImageUrls};
use crate::models::Post;
use crate::summary::meta_description;

/// Shareable metadata for a post page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image: Option<String>,
}

impl PageMeta {
    pub fn for_post(post: &Post, site_url: &str, images: &ImageUrls) -> PageMeta {
        PageMeta {
            title: post.title.clone(),
            description: meta_description(&post.body),
            url: format!("{}{}", site_url, post.path()),
            image: post
                .cover_image
                .as_ref()
                .and_then(|asset| images.url(asset, ImageSize::ORIGINAL)),
        }
    }

    /// `<meta>` tags for the document head. The `<title>` is set by the layout.
    pub fn to_head_html(&self) -> String {
        let mut tags = Vec::new();
        let mut push = |attr: &str, key: &str, value: &str| {
            tags.push(format!(
                "<meta {attr}=\"{key}\" content=\"{}\">",
                encode_minimal(value)
            ));
        };

        if let Some(description) = &self.description {
            push("name", "description", description);
        }
        push("property", "og:title", &self.title);
        if let Some(description) = &self.description {
            push("property", "og:description", description);
        }
        push("property", "og:type", "article");
        push("property", "og:url", &self.url);
        if let Some(image) = &self.image {
            push("property", "og:image", image);
            push("property", "og:image:alt", &self.title);
        }

        push("name", "twitter:card", "summary_large_image");
        push("name", "twitter:title", &self.title);
        if let Some(description) = &self.description {
            push("name", "twitter:description", description);
        }
        if let Some(image) = &self.image {
            push("name", "twitter:image", image);
        }

        tags.join("\n")
    }
}
