//! Renders structured post bodies to HTML.

use htmlescape::encode_minimal;
use tracing::{debug, warn};

use crate::image::{ImageSize, ImageUrls};
use crate::models::{Block, ImageBlock, MarkDef, Span, Spacer, TextBlock};

const BODY_IMAGE: ImageSize = ImageSize::width(700);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Number,
}

impl ListKind {
    fn from_item(item: &str) -> ListKind {
        match item {
            "number" => ListKind::Number,
            _ => ListKind::Bullet,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Number => "ol",
        }
    }
}

pub fn render_body(body: &[Block], images: &ImageUrls) -> String {
    let mut out = String::new();
    // Each entry is an open list whose last <li> is still open.
    let mut lists: Vec<(ListKind, u32)> = Vec::new();

    for block in body {
        if let Block::Text(text) = block {
            if let Some(item) = text.list_item.as_deref() {
                push_list_item(&mut out, &mut lists, ListKind::from_item(item), text);
                continue;
            }
        }
        close_lists(&mut out, &mut lists);

        match block {
            Block::Text(text) => push_text_block(&mut out, text),
            Block::Image(image) => push_image(&mut out, image, images),
            Block::Spacer(spacer) => push_spacer(&mut out, spacer),
            Block::Unknown => debug!("Skipping block of unknown type"),
        }
    }
    close_lists(&mut out, &mut lists);
    out
}

fn push_list_item(
    out: &mut String,
    lists: &mut Vec<(ListKind, u32)>,
    kind: ListKind,
    text: &TextBlock,
) {
    let level = text.level.unwrap_or(1).max(1);
    while let Some(&(open_kind, open_level)) = lists.last() {
        if open_level > level || (open_level == level && open_kind != kind) {
            out.push_str(&format!("</li></{}>", open_kind.tag()));
            lists.pop();
        } else {
            break;
        }
    }

    match lists.last() {
        Some(&(_, open_level)) if open_level == level => out.push_str("</li><li>"),
        _ => {
            out.push_str(&format!("<{}><li>", kind.tag()));
            lists.push((kind, level));
        }
    }
    push_spans(out, &text.children, &text.mark_defs);
}

fn close_lists(out: &mut String, lists: &mut Vec<(ListKind, u32)>) {
    while let Some((kind, _)) = lists.pop() {
        out.push_str(&format!("</li></{}>", kind.tag()));
    }
}

fn block_tag(style: Option<&str>) -> &'static str {
    match style {
        Some("h1") => "h1",
        Some("h2") => "h2",
        Some("h3") => "h3",
        Some("h4") => "h4",
        Some("h5") => "h5",
        Some("h6") => "h6",
        Some("blockquote") => "blockquote",
        _ => "p",
    }
}

fn push_text_block(out: &mut String, text: &TextBlock) {
    let tag = block_tag(text.style.as_deref());
    out.push_str(&format!("<{tag}>"));
    push_spans(out, &text.children, &text.mark_defs);
    out.push_str(&format!("</{tag}>"));
}

fn push_spans(out: &mut String, spans: &[Span], mark_defs: &[MarkDef]) {
    for span in spans {
        let text = span.text.as_deref().unwrap_or("");
        let mut closers = Vec::new();
        for mark in &span.marks {
            if let Some((open, close)) = mark_tags(mark, mark_defs) {
                out.push_str(&open);
                closers.push(close);
            }
        }
        out.push_str(&encode_minimal(text).replace('\n', "<br/>"));
        for close in closers.iter().rev() {
            out.push_str(close);
        }
    }
}

fn mark_tags(mark: &str, mark_defs: &[MarkDef]) -> Option<(String, String)> {
    let simple = |tag: &str| Some((format!("<{tag}>"), format!("</{tag}>")));
    match mark {
        "strong" => simple("strong"),
        "em" => simple("em"),
        "underline" => simple("u"),
        "code" => simple("code"),
        "strike-through" => simple("s"),
        key => {
            let def = mark_defs.iter().find(|d| d.key == key)?;
            let href = def.href.as_deref().filter(|h| def.kind == "link" && is_safe_href(h))?;
            let external = href.starts_with("http://") || href.starts_with("https://");
            let target = if external {
                " target=\"_blank\" rel=\"noopener noreferrer\""
            } else {
                ""
            };
            Some((
                format!("<a href=\"{}\"{target}>", encode_minimal(href)),
                "</a>".to_string(),
            ))
        }
    }
}

fn is_safe_href(href: &str) -> bool {
    ["http://", "https://", "mailto:", "/", "#"]
        .iter()
        .any(|prefix| href.starts_with(prefix))
}

fn push_image(out: &mut String, image: &ImageBlock, images: &ImageUrls) {
    let Some(src) = image.asset.as_ref().and_then(|a| images.url(a, BODY_IMAGE)) else {
        warn!("Skipping body image without a usable asset reference");
        return;
    };
    out.push_str(&format!(
        "<figure class=\"my-6\"><img src=\"{}\" alt=\"{}\" class=\"rounded\"/>",
        encode_minimal(&src),
        encode_minimal(image.alt.as_deref().unwrap_or(""))
    ));
    if let Some(caption) = image.caption.as_deref().filter(|c| !c.is_empty()) {
        out.push_str(&format!(
            "<figcaption class=\"text-xs text-center mt-2\">{}</figcaption>",
            encode_minimal(caption)
        ));
    }
    out.push_str("</figure>");
}

fn push_spacer(out: &mut String, spacer: &Spacer) {
    out.push_str(&format!(
        "<div class=\"spacer\" style=\"height: {}px\" aria-hidden=\"true\"></div>",
        spacer.height()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::paragraph;
    use crate::models::AssetRef;

    fn images() -> ImageUrls {
        ImageUrls::new("p", "d")
    }

    fn span(text: &str, marks: &[&str]) -> Span {
        Span {
            text: Some(text.to_string()),
            marks: marks.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn list_item(kind: &str, level: u32, text: &str) -> Block {
        Block::Text(TextBlock {
            list_item: Some(kind.to_string()),
            level: Some(level),
            children: vec![span(text, &[])],
            ..TextBlock::default()
        })
    }

    #[test]
    fn paragraphs_are_escaped_and_keep_line_breaks() {
        let html = render_body(&[paragraph(&["a < b", "வரி\nஇரண்டு"])], &images());
        assert_eq!(html, "<p>a &lt; bவரி<br/>இரண்டு</p>");
    }

    #[test]
    fn styles_map_to_tags() {
        let block = Block::Text(TextBlock {
            style: Some("h2".into()),
            children: vec![span("தலைப்பு", &[])],
            ..TextBlock::default()
        });
        let quote = Block::Text(TextBlock {
            style: Some("blockquote".into()),
            children: vec![span("q", &[])],
            ..TextBlock::default()
        });
        assert_eq!(
            render_body(&[block, quote], &images()),
            "<h2>தலைப்பு</h2><blockquote>q</blockquote>"
        );
    }

    #[test]
    fn decorators_and_links() {
        let block = Block::Text(TextBlock {
            mark_defs: vec![
                MarkDef {
                    key: "l1".into(),
                    kind: "link".into(),
                    href: Some("https://example.com/?a=1&b=2".into()),
                },
                MarkDef {
                    key: "bad".into(),
                    kind: "link".into(),
                    href: Some("javascript:alert(1)".into()),
                },
            ],
            children: vec![
                span("bold", &["strong", "em"]),
                span("link", &["l1"]),
                span("unsafe", &["bad"]),
                span("plain", &["mystery"]),
            ],
            ..TextBlock::default()
        });
        let html = render_body(&[block], &images());
        assert!(html.contains("<strong><em>bold</em></strong>"));
        assert!(html.contains(
            "<a href=\"https://example.com/?a=1&amp;b=2\" target=\"_blank\" rel=\"noopener noreferrer\">link</a>"
        ));
        assert!(!html.contains("javascript"));
        assert!(html.contains("unsafe"));
        assert!(html.contains("plain"));
    }

    #[test]
    fn spacer_uses_default_height() {
        let html = render_body(
            &[Block::Spacer(Spacer::default()), Block::Spacer(Spacer { height: Some(64.0) })],
            &images(),
        );
        assert!(html.contains("height: 32px"));
        assert!(html.contains("height: 64px"));
    }

    #[test]
    fn images_render_with_caption_and_unknown_blocks_vanish() {
        let image = Block::Image(ImageBlock {
            asset: Some(AssetRef {
                reference: "image-abc-10x20-png".into(),
            }),
            alt: Some("மலர்".into()),
            caption: Some("படம்".into()),
        });
        let broken = Block::Image(ImageBlock::default());
        let html = render_body(&[image, broken, Block::Unknown], &images());
        assert_eq!(
            html,
            "<figure class=\"my-6\"><img src=\"https://cdn.sanity.io/images/p/d/abc-10x20.png?w=700\" alt=\"மலர்\" class=\"rounded\"/><figcaption class=\"text-xs text-center mt-2\">படம்</figcaption></figure>"
        );
    }

    #[test]
    fn consecutive_list_items_share_a_list() {
        let body = vec![
            list_item("bullet", 1, "a"),
            list_item("bullet", 2, "a.1"),
            list_item("bullet", 1, "b"),
            list_item("number", 1, "one"),
            paragraph(&["after"]),
        ];
        assert_eq!(
            render_body(&body, &images()),
            "<ul><li>a<ul><li>a.1</li></ul></li><li>b</li></ul><ol><li>one</li></ol><p>after</p>"
        );
    }
}
