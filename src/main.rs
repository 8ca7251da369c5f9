mod config;
mod content_loader;
mod error;
mod feed;
mod hot_reload;
mod image;
mod metadata;
mod models;
mod pages;
mod portable_text;
mod routes;
mod sanity;
mod state;
mod summary;
mod view;

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::SiteConfig;
use crate::content_loader::load_templates;
use crate::hot_reload::start_content_watcher;
use crate::sanity::SanityClient;
use crate::state::{AppState, RouterState};

#[tokio::main]
async fn main() -> ExitCode {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match SiteConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let templates = match load_templates(&config.content_dir).await {
        Ok(templates) => templates,
        Err(e) => {
            error!("Failed to load templates from {}: {}", config.content_dir.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let content = Arc::new(SanityClient::new(&config));
    let port = config.port;
    let is_development = config.is_development;
    let state = Arc::new(AppState::new(config, templates, content));

    let (tx, _rx) = broadcast::channel(1);
    if is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let app = routes::router(RouterState {
        app_state: state,
        broadcaster: tx,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "listening");
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
