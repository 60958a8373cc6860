//! newsmap-server entry point.
//!
//! Boots the HTTP server that answers Google News sitemap requests.
//! Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::Result;
use newsmap_core::{AppConfig, SettingsService, SiteDb, SitemapGenerator};
use tracing_subscriber::EnvFilter;

mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let db = SiteDb::open(&config.db_path).await?;
    let generator = SitemapGenerator::from_config(&config)?;

    let state = routes::AppState {
        settings: SettingsService::new(db.clone()),
        posts: db,
        generator: Arc::new(generator),
        site_id: config.site_id,
        slug: config.sitemap_slug.clone(),
        query_var: config.query_var.clone(),
    };

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let (primary, alternative) = config.sitemap_urls()?;
    tracing::info!(%addr, %primary, %alternative, "Starting newsmap server");

    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
