//! Progress endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/progress/{story_id}
pub async fn get(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
) -> Result<Json<ProgressResponse>> {
    let games = state.db.get_story_progress(&story_id).await?;
    Ok(Json(ProgressResponse { story_id, games }))
}

/// DELETE /api/progress/{story_id}
pub async fn reset(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
) -> Result<StatusCode> {
    let deleted = state.db.delete_story_progress(&story_id).await?;
    tracing::info!(story = %story_id, deleted, "progress reset");
    Ok(StatusCode::NO_CONTENT)
}
