//! Error types for story-core.

use thiserror::Error;

/// Result type alias using ContentError.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Errors that can occur while loading story content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid story JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate game id {id}")]
    DuplicateGame { id: String },

    #[error("story {id} has no games")]
    EmptyStory { id: String },
}
