//! Preview text for posts.

use crate::models::Block;

pub const DAILY_PREVIEW_CHARS: usize = 300;
pub const LIST_PREVIEW_CHARS: usize = 100;
pub const META_DESCRIPTION_CHARS: usize = 150;

/// Returns the trimmed text of the first paragraph that has something to say.
///
/// Images, spacers and unknown blocks are skipped even when they come first,
/// as are paragraphs with no children or only whitespace. The scan stops at
/// the first hit. An empty string means the body has no usable paragraph.
pub fn first_text_from_body(body: &[Block]) -> String {
    for block in body {
        if let Block::Text(text_block) = block {
            if text_block.children.is_empty() {
                continue;
            }
            let text = text_block.plain_text();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    String::new()
}

/// Cuts `text` to at most `budget` characters. No attempt is made to respect
/// word boundaries.
pub fn truncate_preview(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Description for page metadata: the first paragraph-type block, whatever it
/// holds, cut to [`META_DESCRIPTION_CHARS`].
pub fn meta_description(body: &[Block]) -> Option<String> {
    body.iter().find_map(|block| match block {
        Block::Text(text_block) => Some(truncate_preview(
            &text_block.plain_text(),
            META_DESCRIPTION_CHARS,
        )),
        _ => None,
    })
}
