//! Serve letterboxed thumbnails of remote images

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod api; // Routing, State, and the request pipeline
mod codec; // Decode and encode images
mod config; // Command line and environment
mod domain; // Domain types and validation
mod fetch; // Remote Fetcher
mod httpfetch; // Remote Fetcher (over HTTP)
mod primitive; // Primitives + essential dependencies
#[cfg(test)]
mod quality; // Similarity scores for tests
mod thumb; // Fit and letterbox

use crate::{
    api::{install_panic_hook, router, AppState},
    config::Config,
    httpfetch::HttpFetch,
    primitive::{anyhow::Context, tracing::instrument},
};

#[tokio::main]
#[instrument]
async fn main() -> anyhow::Result<()> {
    // Set up logging. RUST_LOG overrides the default.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    install_panic_hook();

    let config = Config::parse();
    tracing::info!("Configuration: {config:?}");

    let fetch = HttpFetch::new(config.fetch_timeout())?;
    let app = router(AppState {
        fetch: Arc::new(fetch),
        jpeg_quality: config.jpeg_quality,
        max_canvas_pixels: config.max_canvas_pixels,
        decode_limits: config.decode_limits(),
    });

    tracing::info!("Serving at {}", config.bind);
    axum::Server::try_bind(&config.bind)
        .with_context(|| format!("cannot bind {}", config.bind))?
        .serve(app.into_make_service())
        .await
        .context("server stopped")
}
