//! HTML for each page, wrapped in the site layout.

use htmlescape::encode_minimal;
use tracing::warn;

use crate::feed::{CategoryFilter, HomeFeed};
use crate::image::{ImageSize, ImageUrls};
use crate::metadata::PageMeta;
use crate::models::{CategoryLabels, Post};
use crate::portable_text::render_body;
use crate::state::Templates;
use crate::summary::{first_text_from_body, truncate_preview, DAILY_PREVIEW_CHARS, LIST_PREVIEW_CHARS};
use crate::view::LoadState;

pub const SITE_TITLE: &str = "அம்மாவின் எழுத்துக்கள்";
const SITE_TAGLINE: &str = "கவிதைகள், குறுநாவல்கள் மற்றும் நீண்ட கதைகள்";
const READ_MORE: &str = "மேலும் படிக்க";
const DAILY_HEADING: &str = "இன்றைய பகிர்வு";
const PREVIOUS_HEADING: &str = "முந்தைய பகிர்வுகள்";
const HOME_LINK: &str = "← முகப்பு";
const ARTIST_PREFIX: &str = "படக்கலைஞர்";
const SHARE_LABEL: &str = "பகிர்";

pub const LOADING_MESSAGE: &str = "Loading...";
pub const ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

const DAILY_COVER: ImageSize = ImageSize::exact(300, 200);
const DETAIL_COVER: ImageSize = ImageSize::width(400);

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

const SHARE_SCRIPT: &str = r#"
<script>
    function sharePost(button) {
        if (navigator.share) {
            navigator.share({ title: button.dataset.title, url: window.location.href });
        }
    }
</script>
"#;

/// Everything a page needs besides its own data.
pub struct PageContext<'a> {
    pub templates: &'a Templates,
    pub labels: &'a CategoryLabels,
    pub images: &'a ImageUrls,
    pub site_url: &'a str,
    pub is_development: bool,
}

fn nav_html() -> String {
    format!(
        r#"<nav class="site-nav">
  <div class="site-brand">
    <h1><a href="/">{SITE_TITLE}</a></h1>
    <p>{SITE_TAGLINE}</p>
  </div>
  <div class="site-links">
    <a href="/about">About</a>
    <a href="https://facebook.com" target="_blank" rel="noopener noreferrer">Facebook</a>
    <a href="/login">Login</a>
  </div>
</nav>"#
    )
}

pub fn render_with_layout(
    ctx: &PageContext<'_>,
    title: &str,
    head: &str,
    content: &str,
) -> String {
    let mut layout = ctx.templates.layout_html.clone();
    if ctx.is_development {
        layout = layout.replace("</body>", &format!("{}</body>", HOT_RELOAD_SCRIPT));
    }

    let title = encode_minimal(title);
    let nav = nav_html();
    fill_layout(
        &layout,
        &[
            ("{{ title }}", title.as_str()),
            ("{{ head }}", head),
            ("{{ nav }}", nav.as_str()),
            ("{{ content }}", content),
        ],
    )
}

/// Substitutes placeholders in one pass over the template. Inserted values
/// are never scanned again, so post text that looks like a placeholder stays
/// as written.
fn fill_layout(layout: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(layout.len());
    let mut rest = layout;
    while let Some((at, placeholder, value)) = values
        .iter()
        .filter_map(|(placeholder, value)| rest.find(placeholder).map(|at| (at, *placeholder, *value)))
        .min_by_key(|(at, _, _)| *at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + placeholder.len()..];
    }
    out.push_str(rest);
    out
}

fn meta_line(post: &Post, labels: &CategoryLabels) -> String {
    format!(
        "{} • {}",
        post.display_date(),
        labels.label(&post.category).unwrap_or("")
    )
}

fn post_href(post: &Post) -> String {
    post.path()
}

fn preview_html(post: &Post, budget: usize) -> String {
    let preview = truncate_preview(&first_text_from_body(&post.body), budget);
    format!(
        "<p class=\"preview\">{}... <a href=\"{}\" class=\"read-more\">{READ_MORE}</a></p>",
        encode_minimal(&preview),
        post_href(post)
    )
}

fn cover_img(post: &Post, images: &ImageUrls, size: ImageSize, class: &str) -> String {
    let Some(asset) = &post.cover_image else {
        return String::new();
    };
    match images.url(asset, size) {
        Some(src) => format!(
            "<img src=\"{}\" alt=\"cover\" class=\"{class}\"/>",
            encode_minimal(&src)
        ),
        None => {
            warn!(post = %post.id, "Cover image reference is not usable");
            String::new()
        }
    }
}

fn daily_section(post: &Post, ctx: &PageContext<'_>) -> String {
    format!(
        r#"<section class="daily-post">
  <h2>{DAILY_HEADING}</h2>
  <div class="daily-body">
    {cover}
    <div>
      <a href="{href}"><h3>{title}</h3></a>
      <div class="post-meta">{meta}</div>
      {preview}
    </div>
  </div>
</section>"#,
        cover = cover_img(post, ctx.images, DAILY_COVER, "daily-cover"),
        href = post_href(post),
        title = encode_minimal(&post.title),
        meta = encode_minimal(&meta_line(post, ctx.labels)),
        preview = preview_html(post, DAILY_PREVIEW_CHARS),
    )
}

fn filter_bar(active: CategoryFilter, labels: &CategoryLabels) -> String {
    let buttons: Vec<String> = CategoryFilter::options()
        .map(|filter| {
            let class = if filter == active { "filter active" } else { "filter" };
            format!(
                "<a href=\"/?category={key}\" class=\"{class}\" data-category=\"{key}\">{label}</a>",
                key = filter.key(),
                label = labels.label(filter.key()).unwrap_or(filter.key()),
            )
        })
        .collect();
    format!("<div class=\"filters\">{}</div>", buttons.join(""))
}

fn list_entry(post: &Post, labels: &CategoryLabels) -> String {
    format!(
        r#"<article class="post-entry" data-id="{id}">
  <h3><a href="{href}">{title}</a></h3>
  <div class="post-meta">{meta}</div>
  {preview}
</article>"#,
        id = encode_minimal(&post.id),
        href = post_href(post),
        title = encode_minimal(&post.title),
        meta = encode_minimal(&meta_line(post, labels)),
        preview = preview_html(post, LIST_PREVIEW_CHARS),
    )
}

pub fn home_page(feed: &HomeFeed<'_>, ctx: &PageContext<'_>) -> String {
    let daily = feed
        .daily
        .map(|post| daily_section(post, ctx))
        .unwrap_or_default();
    let entries: String = feed
        .list
        .iter()
        .map(|post| list_entry(post, ctx.labels))
        .collect();

    let content = format!(
        r#"{daily}
<div class="previous">
  <h2>{PREVIOUS_HEADING}</h2>
  {filters}
</div>
<section class="post-list">{entries}</section>"#,
        filters = filter_bar(feed.filter, ctx.labels),
    );
    render_with_layout(ctx, SITE_TITLE, "", &content)
}

fn message_page(ctx: &PageContext<'_>, message: &str) -> String {
    let content = format!("<div class=\"message\">{}</div>", encode_minimal(message));
    render_with_layout(ctx, SITE_TITLE, "", &content)
}

pub fn post_page(state: &LoadState<Post>, ctx: &PageContext<'_>) -> String {
    let post = match state {
        LoadState::Loading => return message_page(ctx, LOADING_MESSAGE),
        LoadState::Failed(_) => return message_page(ctx, ERROR_MESSAGE),
        LoadState::Loaded(post) => post,
    };

    let title = encode_minimal(&post.title);
    let mut meta = meta_line(post, ctx.labels);
    if let Some(artist) = &post.artist_credit {
        meta.push_str(&format!(" • {ARTIST_PREFIX}: {artist}"));
    }
    let cover = match cover_img(post, ctx.images, DETAIL_COVER, "post-cover") {
        img if img.is_empty() => String::new(),
        img => format!("<div class=\"cover\">{img}</div>"),
    };

    let content = format!(
        r#"<div class="back"><a href="/">{HOME_LINK}</a></div>
<article class="post">
  <h1>{title} <button class="share" data-title="{title}" onclick="sharePost(this)" aria-label="share">⤴</button></h1>
  <div class="post-meta">{meta}</div>
  {cover}
  <div class="post-body">{body}</div>
  <div class="post-stats">
    <span class="views">👁 {views}</span>
    <span class="likes">♥ {likes}</span>
    <button class="share" data-title="{title}" onclick="sharePost(this)">⤴ {SHARE_LABEL}</button>
  </div>
</article>
{SHARE_SCRIPT}"#,
        meta = encode_minimal(&meta),
        body = render_body(&post.body, ctx.images),
        views = post.view_count.unwrap_or(0),
        likes = post.like_count.unwrap_or(0),
    );

    let head = PageMeta::for_post(post, ctx.site_url, ctx.images).to_head_html();
    render_with_layout(ctx, &post.title, &head, &content)
}

pub fn about_page(ctx: &PageContext<'_>) -> String {
    let content = format!(
        "<article class=\"about\"><h1>{}</h1>{}</article>",
        encode_minimal(&ctx.templates.about_title),
        ctx.templates.about_html
    );
    render_with_layout(ctx, &ctx.templates.about_title, "", &content)
}

pub fn not_found_page(ctx: &PageContext<'_>, path: &str) -> String {
    let content = ctx
        .templates
        .not_found_html
        .replace("{{path}}", &encode_minimal(path));
    render_with_layout(ctx, SITE_TITLE, "", &content)
}
