//! Game session endpoints
//!
//! Sessions are poll-based: every response carries the current view and the
//! sounds queued since the previous response.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

fn session_not_found(session_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("session {}", session_id))
}

/// POST /api/sessions
pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let story = state
        .stories
        .get(&req.story_id)
        .ok_or_else(|| ApiError::NotFound(format!("story {}", req.story_id)))?;
    let response = state.sessions.start(&story, &req.game_id)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/sessions/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let response = state
        .sessions
        .snapshot(session_id)
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(response))
}

/// POST /api/sessions/{id}/events
pub async fn event(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(event): Json<GameEvent>,
) -> Result<Json<SessionResponse>> {
    let response = state
        .sessions
        .dispatch(session_id, event)
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(response))
}

/// DELETE /api/sessions/{id}?save=true
pub async fn close(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<CloseSessionQuery>,
) -> Result<Json<CloseSessionResponse>> {
    if !state.sessions.close(session_id, query.save) {
        return Err(session_not_found(session_id));
    }
    Ok(Json(CloseSessionResponse {
        session_id,
        closed: true,
    }))
}
