//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from story-core and game-session
pub use game_session::{GameEvent, GameView};
pub use story_core::{ProgressReport, SoundKind, StorySummary};

// === Database Entity Types ===

/// Stored progress of one game
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameProgress {
    pub story_id: String,
    pub game_id: String,
    pub best_percent: i16,
    pub last_percent: i16,
    pub last_errors: i32,
    pub plays: i32,
    pub updated_at: DateTime<Utc>,
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct StoryListResponse {
    pub stories: Vec<StorySummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub story_id: String,
    pub game_id: String,
}

/// Current state of a live session plus the sounds queued since the last poll
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    /// `None` once the session has closed
    pub view: Option<GameView>,
    pub sounds: Vec<SoundKind>,
}

#[derive(Debug, Deserialize)]
pub struct CloseSessionQuery {
    #[serde(default = "default_save")]
    pub save: bool,
}

fn default_save() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CloseSessionResponse {
    pub session_id: Uuid,
    pub closed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub story_id: String,
    pub games: Vec<GameProgress>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub term: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageResponse {
    pub term: String,
    pub url: String,
    /// Set when no illustration was found and the placeholder is returned
    pub placeholder: bool,
}
