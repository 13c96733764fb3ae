//! HTTP surface: GET-only JSON routes with permissive CORS.

mod error;
mod routes;

use crate::config::Config;
use crate::convert::{Converter, Downloads, YtDlpConverter};
use crate::lyrics::LyricsOvhClient;
use crate::upstream::Resolver;
use anyhow::Context;
use axum::http::Method;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub lyrics: LyricsOvhClient,
    pub downloads: Downloads,
    pub converter: Arc<dyn Converter>,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let resolver = Resolver::from_config(&cfg.upstream).context("build resolver")?;
        let lyrics = LyricsOvhClient::new(
            &cfg.lyrics.base_url,
            Duration::from_secs(cfg.upstream.timeout_secs.max(1)),
        )?;
        let downloads = Downloads::open(&cfg.paths.downloads_dir)?;
        let converter: Arc<dyn Converter> = Arc::new(YtDlpConverter::new(&cfg.convert.program));
        Ok(Self {
            resolver,
            lyrics,
            downloads,
            converter,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/", get(routes::root))
        .route("/trending", get(routes::trending))
        .route("/search", get(routes::search))
        .route("/stream/{id}", get(routes::stream))
        .route("/lyrics", get(routes::lyrics))
        .route("/convert/{id}", get(routes::convert))
        .route("/downloads", get(routes::downloads))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(cfg: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(cfg)?;
    tracing::info!(
        mirrors = state.resolver.pool().len(),
        strategy = ?state.resolver.pool().strategy(),
        downloads = %state.downloads.dir().display(),
        "upstream pool ready"
    );

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.server.host, cfg.server.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, router(state)).await.context("serve http")?;
    Ok(())
}
