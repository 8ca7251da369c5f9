use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::SiteConfig;
use crate::image::ImageUrls;
use crate::models::CategoryLabels;
use crate::sanity::ContentSource;

pub type RefreshBroadcaster = broadcast::Sender<()>;

/// Page templates read from the content directory.
#[derive(Debug, Clone)]
pub struct Templates {
    pub layout_html: String,
    pub not_found_html: String, // supports {{path}} placeholder
    pub about_title: String,
    pub about_html: String,
}

pub struct AppState {
    pub templates: RwLock<Templates>,
    pub content: Arc<dyn ContentSource>,
    pub images: ImageUrls,
    pub labels: CategoryLabels,
    pub config: SiteConfig,
}

impl AppState {
    pub fn new(config: SiteConfig, templates: Templates, content: Arc<dyn ContentSource>) -> Self {
        AppState {
            templates: RwLock::new(templates),
            content,
            images: ImageUrls::new(&config.project_id, &config.dataset),
            labels: CategoryLabels::TAMIL,
            config,
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
