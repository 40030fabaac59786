//! Story endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use story_core::Story;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/stories
pub async fn list(State(state): State<AppState>) -> Json<StoryListResponse> {
    Json(StoryListResponse {
        stories: state.stories.summaries(),
    })
}

/// GET /api/stories/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
) -> Result<Json<Story>> {
    let story = state
        .stories
        .get(&story_id)
        .ok_or_else(|| ApiError::NotFound(format!("story {}", story_id)))?;
    Ok(Json(story.as_ref().clone()))
}
