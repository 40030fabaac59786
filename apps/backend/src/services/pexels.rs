//! Memory-card illustrations from the Pexels search API.

use async_trait::async_trait;
use game_session::{ImageLookup, LookupError};
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.pexels.com/v1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    medium: Option<String>,
    original: Option<String>,
}

/// Image lookup backed by Pexels. Without an API key every lookup is absent.
#[derive(Clone)]
pub struct PexelsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PexelsClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// First usable photo URL of a search response body.
fn first_photo_url(body: &str) -> Result<Option<String>, LookupError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    Ok(response
        .photos
        .into_iter()
        .find_map(|photo| photo.src.medium.or(photo.src.original)))
}

#[async_trait]
impl ImageLookup for PexelsClient {
    async fn lookup(&self, term: &str) -> Result<Option<String>, LookupError> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("Authorization", api_key)
            .query(&[("query", term), ("per_page", "1")])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;
        let url = first_photo_url(&body)?;
        tracing::debug!(term, found = url.is_some(), "pexels lookup");
        Ok(url)
    }
}
