use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::Html,
    routing::{get, get_service},
    Router,
};
use serde::Deserialize;
use tower_http::services::ServeDir;
use tracing::debug;

use crate::feed::{CategoryFilter, HomeFeed};
use crate::hot_reload::ws_handler;
use crate::pages::{self, PageContext};
use crate::state::{AppState, RouterState, Templates};
use crate::view::{DetailView, ListView, LoadState};

#[derive(Deserialize, Debug, Default)]
pub struct HomeQuery {
    category: Option<String>,
}

fn page_context<'a>(state: &'a AppState, templates: &'a Templates) -> PageContext<'a> {
    PageContext {
        templates,
        labels: &state.labels,
        images: &state.images,
        site_url: &state.config.site_url,
        is_development: state.config.is_development,
    }
}

async fn homepage(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HomeQuery>,
) -> Html<String> {
    let mut view = ListView::new();
    let ticket = view.begin();
    let result = state.content.fetch_posts().await;
    view.complete(ticket, result);

    let filter = CategoryFilter::from_query(query.category.as_deref());
    debug!(filter = filter.key(), posts = view.posts().len(), "rendering home");
    let feed = HomeFeed::build(view.posts(), filter);

    let templates = state.templates.read().await;
    Html(pages::home_page(&feed, &page_context(&state, &templates)))
}

async fn render_post(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Html<String>) {
    let mut view = DetailView::new();
    let ticket = view.begin();
    let result = state.content.fetch_post(&slug).await;
    view.complete(ticket, result);

    let status = match view.state() {
        LoadState::Loaded(_) => StatusCode::OK,
        LoadState::Failed(e) if e.is_not_found() => StatusCode::NOT_FOUND,
        LoadState::Failed(_) => StatusCode::BAD_GATEWAY,
        LoadState::Loading => StatusCode::SERVICE_UNAVAILABLE,
    };

    let templates = state.templates.read().await;
    let page = pages::post_page(view.state(), &page_context(&state, &templates));
    (status, Html(page))
}

async fn about(State(state): State<Arc<AppState>>) -> Html<String> {
    let templates = state.templates.read().await;
    Html(pages::about_page(&page_context(&state, &templates)))
}

async fn not_found(State(state): State<Arc<AppState>>, uri: Uri) -> (StatusCode, Html<String>) {
    let templates = state.templates.read().await;
    let page = pages::not_found_page(&page_context(&state, &templates), uri.path());
    (StatusCode::NOT_FOUND, Html(page))
}

pub fn router(router_state: RouterState) -> Router {
    let config = &router_state.app_state.config;
    let static_dir = get_service(ServeDir::new(config.content_dir.join("static")));

    let mut app = Router::new()
        .route("/", get(homepage))
        .route("/post/{slug}", get(render_post))
        .route("/about", get(about))
        .nest_service("/static", static_dir);

    if config.is_development {
        app = app.route("/ws", get(ws_handler));
    }

    app.fallback(not_found).with_state(router_state)
}
