//! Illustration lookup endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use game_session::placeholder_image;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/images?term=...
///
/// Lookup failures degrade to the placeholder like they do in a memory game.
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Json<ImageResponse>> {
    let term = query.term.trim().to_string();
    if term.is_empty() {
        return Err(ApiError::BadRequest("term must not be empty".to_string()));
    }

    let found = match state.images.lookup(&term).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(term = %term, error = %e, "image lookup failed");
            None
        }
    };

    let response = match found {
        Some(url) => ImageResponse {
            term,
            url,
            placeholder: false,
        },
        None => ImageResponse {
            url: placeholder_image(&term),
            term,
            placeholder: true,
        },
    };
    Ok(Json(response))
}
