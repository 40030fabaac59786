//! Static asset endpoint served through the offline cache

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::Result;
use crate::AppState;

const CACHE_STATUS: &str = "x-cache";

/// GET /assets/{*path}
pub async fn get(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let (asset, source) = state.assets.fetch_path(&path).await?;

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|tags| tags.split(',').any(|tag| tag.trim() == asset.etag || tag.trim() == "*"));

    let mut response = if not_modified {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        (
            [(header::CONTENT_TYPE, asset.content_type.clone())],
            asset.body.clone(),
        )
            .into_response()
    };

    let response_headers = response.headers_mut();
    if let Ok(etag) = HeaderValue::from_str(&asset.etag) {
        response_headers.insert(header::ETAG, etag);
    }
    response_headers.insert(CACHE_STATUS, HeaderValue::from_static(source.as_str()));
    Ok(response)
}
