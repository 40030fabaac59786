pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use game_session::ImageLookup;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::db::Database;
use crate::services::assets::{AssetCache, StaticOrigin};
use crate::services::pexels::PexelsClient;
use crate::services::progress::ProgressWriter;
use crate::services::sessions::SessionRegistry;
use crate::services::stories::StoryLibrary;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub stories: Arc<StoryLibrary>,
    pub sessions: Arc<SessionRegistry>,
    pub images: Arc<dyn ImageLookup>,
    pub assets: Arc<AssetCache>,
}

/// Build the full router over a prepared state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Story routes
        .route("/api/stories", get(routes::stories::list))
        .route("/api/stories/{id}", get(routes::stories::get))
        // Session routes
        .route("/api/sessions", post(routes::sessions::start))
        .route(
            "/api/sessions/{id}",
            get(routes::sessions::get).delete(routes::sessions::close),
        )
        .route("/api/sessions/{id}/events", post(routes::sessions::event))
        // Progress routes
        .route(
            "/api/progress/{story_id}",
            get(routes::progress::get).delete(routes::progress::reset),
        )
        // Image routes
        .route("/api/images", get(routes::images::lookup))
        // Offline assets
        .route("/assets/{*path}", get(routes::assets::get))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Arc::new(Database::connect(&config.database_url).await?);

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    tracing::info!("Loading stories from {}...", config.stories_dir.display());
    let stories = StoryLibrary::load_dir(&config.stories_dir).await?;

    let (progress, progress_task) = ProgressWriter::spawn(db.clone());

    let pexels = PexelsClient::new(config.pexels_api_key.clone());
    if !pexels.is_configured() {
        tracing::warn!("PEXELS_API_KEY not set, memory cards use placeholders");
    }
    let images: Arc<dyn ImageLookup> = Arc::new(pexels);

    let assets = AssetCache::new(Arc::new(StaticOrigin::new(config.asset_root.clone())));
    match assets.install().await {
        Ok(count) => tracing::info!(count, "Precached assets"),
        Err(e) => tracing::warn!(error = %e, "Asset precache failed, serving from origin"),
    }
    assets.activate();

    let sessions = SessionRegistry::new(progress, images.clone(), config.session.clone());
    let sweeper = sessions.spawn_sweeper(config.session_idle);

    let state = AppState {
        db,
        stories: Arc::new(stories),
        sessions: sessions.clone(),
        images,
        assets: Arc::new(assets),
    };

    let app = build_router(state);
    let addr = config.addr();

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!(live = sessions.len(), "Closing live sessions...");
    sessions.close_all(true);
    // The registry holds the last writer handle; dropping it lets the task drain.
    drop(sessions);
    match tokio::time::timeout(Duration::from_secs(5), progress_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "progress writer task failed"),
        Err(_) => tracing::warn!("progress writer did not drain in time"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

async fn health_check() -> &'static str {
    "OK"
}
