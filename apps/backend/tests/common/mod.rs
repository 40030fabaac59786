//! Common test utilities and fixtures for integration tests.
//!
//! `TestContext` builds the full router over in-memory collaborators:
//! a fixture story library, a captured progress channel, a scripted image
//! lookup and an asset cache backed by a map. The database pool is lazy,
//! so only the progress endpoints need a running PostgreSQL
//! (set DATABASE_URL) and those tests are ignored by default.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use game_session::{ImageLookup, NoImages, SessionConfig};
use story_core::{ProgressReport, Story};
use tokio::sync::mpsc::UnboundedReceiver;

use interactive_stories_backend::build_router;
use interactive_stories_backend::db::Database;
use interactive_stories_backend::services::assets::{Asset, AssetCache, AssetError, AssetOrigin};
use interactive_stories_backend::services::progress::ProgressWriter;
use interactive_stories_backend::services::sessions::SessionRegistry;
use interactive_stories_backend::services::stories::StoryLibrary;
use interactive_stories_backend::AppState;

pub const STORY_JSON: &str = r#"{
    "id": "lost-cat",
    "title": "The Lost Cat <El gato perdido>",
    "glossary": [
        {"word": "the", "translation": "el"},
        {"word": "cat", "translation": "gato"},
        {"word": "sleeps", "translation": "duerme"}
    ],
    "games": [
        {"id": "quiz", "t": "Quiz <Preguntas>", "type": "quiz", "q": [
            {"q": "What color is the cat? <¿De qué color es el gato?>", "o": ["black", "white"], "a": "black"},
            {"q": "Where is the cat? <¿Dónde está el gato?>", "o": ["home", "park"], "a": "park"}
        ]},
        {"id": "order", "t": "Order <Ordena>", "type": "sentences", "it": ["The cat sleeps. <El gato duerme.>"]},
        {"id": "cards", "t": "Memory <Memoria>", "type": "memory", "v_str": "cat <gato> | dog <perro>"},
        {"id": "spell", "t": "Spell <Deletrea>", "type": "blanks", "q": [
            {"s": "The _____ sleeps. <El _____ duerme.>", "a": "cat <gato>"}
        ]}
    ]
}"#;

pub fn fixture_story() -> Story {
    Story::from_json(STORY_JSON).expect("fixture story parses")
}

/// Asset origin backed by a map of request paths.
#[derive(Default)]
pub struct MemoryOrigin {
    assets: HashMap<String, Asset>,
}

impl MemoryOrigin {
    pub fn with(mut self, request: &str, body: &str, content_type: &str) -> Self {
        self.assets
            .insert(request.to_string(), Asset::new(body.to_string(), content_type));
        self
    }
}

#[async_trait]
impl AssetOrigin for MemoryOrigin {
    async fn fetch(&self, request: &str) -> Result<Asset, AssetError> {
        self.assets
            .get(request.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| AssetError::NotFound(request.to_string()))
    }
}

pub fn asset_origin() -> MemoryOrigin {
    MemoryOrigin::default()
        .with("games.js", "console.log('games');", "text/javascript; charset=utf-8")
        .with("sounds/ok.mp3", "ID3", "audio/mpeg")
        .with("credits.html", "<p>credits</p>", "text/html; charset=utf-8")
}

/// Test context holding the router and the captured progress reports.
pub struct TestContext {
    pub db: Arc<Database>,
    pub sessions: Arc<SessionRegistry>,
    pub progress: UnboundedReceiver<ProgressReport>,
    app: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_images(Arc::new(NoImages)).await
    }

    pub async fn with_images(images: Arc<dyn ImageLookup>) -> Self {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/interactive_stories_test".to_string());
        let db = Arc::new(Database::connect_lazy(&database_url).expect("Failed to create lazy pool"));

        let stories = StoryLibrary::from_stories(vec![fixture_story()]).expect("fixture library");
        let (writer, progress) = ProgressWriter::channel();
        let sessions = SessionRegistry::new(writer, images.clone(), SessionConfig::seeded(7));

        let assets = AssetCache::new(Arc::new(asset_origin())).with_manifest(&["games.js", "sounds/ok.mp3"]);
        assets.install().await.expect("Failed to precache test assets");
        assets.activate();

        let state = AppState {
            db: db.clone(),
            stories: Arc::new(stories),
            sessions: sessions.clone(),
            images,
            assets: Arc::new(assets),
        };

        Self {
            db,
            sessions,
            progress,
            app: build_router(state),
        }
    }

    /// Context backed by a migrated database.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not reachable.
    pub async fn with_database() -> Self {
        let ctx = Self::new().await;
        ctx.db.run_migrations().await.expect("Failed to run migrations");
        ctx
    }

    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Remove stored progress of the fixture story.
    pub async fn cleanup_progress(&self) {
        let _ = self.db.delete_story_progress("lost-cat").await;
    }
}
