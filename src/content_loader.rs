use std::path::Path;

use gray_matter::{engine::YAML, Matter};
use pulldown_cmark::{html, Options, Parser};
use tokio::fs;
use tracing::{error, info, warn};

use crate::models::FrontMatter;
use crate::state::{AppState, Templates};

const DEFAULT_ABOUT_TITLE: &str = "About";

pub async fn load_templates(content_dir: &Path) -> Result<Templates, std::io::Error> {
    let layout_html = fs::read_to_string(content_dir.join("layout.html")).await?;
    let not_found_html = fs::read_to_string(content_dir.join("not_found.html")).await?;
    let about_md = fs::read_to_string(content_dir.join("about.md")).await?;
    let (about_title, about_html) = render_markdown_page(&about_md);

    Ok(Templates {
        layout_html,
        not_found_html,
        about_title,
        about_html,
    })
}

/// Splits off the front matter and renders the rest as HTML.
pub fn render_markdown_page(source: &str) -> (String, String) {
    let matter = Matter::<YAML>::new();
    let (title, markdown_body) = match matter.parse::<FrontMatter>(source) {
        Ok(parsed) => (
            parsed.data.map(|fm| fm.title),
            parsed.content,
        ),
        Err(e) => {
            warn!("Failed to parse front matter: {}", e);
            (None, source.to_string())
        }
    };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(&markdown_body, options);
    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);

    (
        title.unwrap_or_else(|| DEFAULT_ABOUT_TITLE.to_string()),
        html_out,
    )
}

pub async fn reload_content(app_state: &AppState) {
    info!("Reloading page templates...");
    match load_templates(&app_state.config.content_dir).await {
        Ok(templates) => {
            *app_state.templates.write().await = templates;
            info!("Templates successfully reloaded.");
        }
        Err(e) => {
            error!("Failed to reload templates: {}", e);
        }
    }
}
