//! Offline asset cache for the story player.
//!
//! A versioned, cache-first store modelled on a browser service worker:
//! `install` precaches an explicit manifest, `activate` evicts caches of
//! older versions, and `fetch` answers from the current cache before going
//! to the origin. Requests to advertising hosts always go to the network
//! and are never cached.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use parking_lot::RwLock;
use reqwest::{Client, Url};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Current cache version. Bump to invalidate every client cache.
pub const CACHE_NAME: &str = "interactive-stories-cache-v1";

/// Assets precached on install.
pub const PRECACHE_MANIFEST: &[&str] = &[
    "/",
    "index.html",
    "games.js",
    "banner.png",
    "icons/icon-192.png",
    "icons/icon-512.png",
    "sounds/click.mp3",
    "sounds/congrats.flac",
    "sounds/ok.mp3",
    "sounds/select.wav",
    "sounds/wrong.wav",
];

/// Third-party advertising hosts that must always reach the network.
pub const BYPASS_HOSTS: &[&str] = &[
    "pagead2.googlesyndication.com",
    "tpc.googlesyndication.com",
    "googleads.g.doubleclick.net",
    "adservice.google.com",
];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Invalid asset path: {0}")]
    InvalidPath(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to precache {path}: {reason}")]
    Install { path: String, reason: String },
}

/// A fetched asset with its content type and strong ETag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub body: Bytes,
    pub content_type: String,
    pub etag: String,
}

impl Asset {
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        let body = body.into();
        let etag = format!("\"{:x}\"", Sha256::digest(&body));
        Self {
            body,
            content_type: content_type.into(),
            etag,
        }
    }
}

/// Where an asset was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
    /// Advertising host, fetched without touching the cache.
    Bypass,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchSource::Cache => "hit",
            FetchSource::Network => "miss",
            FetchSource::Bypass => "bypass",
        }
    }
}

/// The network side of the cache.
#[async_trait]
pub trait AssetOrigin: Send + Sync {
    async fn fetch(&self, request: &str) -> Result<Asset, AssetError>;
}

/// Whether `host` is one of `hosts` or a subdomain of one.
fn host_matches(host: &str, hosts: &[String]) -> bool {
    hosts
        .iter()
        .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)))
}

/// Origin serving relative paths from a directory.
///
/// Absolute URLs are only fetched over HTTP for the advertising hosts; any
/// other URL is rejected.
pub struct StaticOrigin {
    root: PathBuf,
    client: Client,
    remote_hosts: Vec<String>,
}

impl StaticOrigin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            client: Client::new(),
            remote_hosts: BYPASS_HOSTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn resolve(&self, request: &str) -> Result<PathBuf, AssetError> {
        let relative = match request.trim_start_matches('/') {
            "" => "index.html",
            path => path,
        };
        let path = Path::new(relative);
        if !path.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(AssetError::InvalidPath(request.to_string()));
        }
        Ok(self.root.join(path))
    }

    async fn fetch_url(&self, url: Url) -> Result<Asset, AssetError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AssetError::Network(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound(url.to_string()));
        }
        if !response.status().is_success() {
            return Err(AssetError::Network(format!("{} returned {}", url, response.status())));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| AssetError::Network(e.to_string()))?;
        Ok(Asset::new(body, content_type))
    }
}

#[async_trait]
impl AssetOrigin for StaticOrigin {
    async fn fetch(&self, request: &str) -> Result<Asset, AssetError> {
        if let Ok(url) = Url::parse(request) {
            let allowed = matches!(url.scheme(), "http" | "https")
                && url
                    .host_str()
                    .is_some_and(|host| host_matches(host, &self.remote_hosts));
            if !allowed {
                return Err(AssetError::InvalidPath(request.to_string()));
            }
            return self.fetch_url(url).await;
        }

        let path = self.resolve(request)?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Asset::new(body, content_type_for(&path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(request.to_string()))
            }
            Err(e) => Err(AssetError::Io(e.to_string())),
        }
    }
}

/// Content type from a file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

type Cache = HashMap<String, Asset>;

/// Versioned cache-first asset store.
pub struct AssetCache {
    name: String,
    manifest: Vec<String>,
    bypass_hosts: Vec<String>,
    caches: RwLock<HashMap<String, Cache>>,
    origin: Arc<dyn AssetOrigin>,
}

impl AssetCache {
    pub fn new(origin: Arc<dyn AssetOrigin>) -> Self {
        Self {
            name: CACHE_NAME.to_string(),
            manifest: PRECACHE_MANIFEST.iter().map(|s| s.to_string()).collect(),
            bypass_hosts: BYPASS_HOSTS.iter().map(|s| s.to_string()).collect(),
            caches: RwLock::new(HashMap::new()),
            origin,
        }
    }

    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_manifest(mut self, manifest: &[&str]) -> Self {
        self.manifest = manifest.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn cache_name(&self) -> &str {
        &self.name
    }

    /// Precache the whole manifest. All or nothing: one failure keeps the
    /// current cache untouched.
    pub async fn install(&self) -> Result<usize, AssetError> {
        let mut fresh = Cache::new();
        for entry in &self.manifest {
            let asset = self
                .origin
                .fetch(entry)
                .await
                .map_err(|e| AssetError::Install {
                    path: entry.clone(),
                    reason: e.to_string(),
                })?;
            fresh.insert(cache_key(entry), asset);
        }

        let count = fresh.len();
        self.caches
            .write()
            .entry(self.name.clone())
            .or_default()
            .extend(fresh);
        tracing::info!(cache = %self.name, count, "asset cache installed");
        Ok(count)
    }

    /// Drop every cache that does not belong to the current version.
    pub fn activate(&self) -> Vec<String> {
        let mut caches = self.caches.write();
        let stale: Vec<String> = caches
            .keys()
            .filter(|name| **name != self.name)
            .cloned()
            .collect();
        for name in &stale {
            caches.remove(name);
            tracing::info!(cache = %name, "stale asset cache evicted");
        }
        stale
    }

    /// Store an asset under a named cache.
    pub fn put(&self, cache_name: &str, request: &str, asset: Asset) {
        self.caches
            .write()
            .entry(cache_name.to_string())
            .or_default()
            .insert(cache_key(request), asset);
    }

    /// Cache-first fetch of a client-supplied path. Absolute URLs are refused.
    pub async fn fetch_path(&self, path: &str) -> Result<(Asset, FetchSource), AssetError> {
        if Url::parse(path).is_ok() {
            return Err(AssetError::InvalidPath(path.to_string()));
        }
        self.fetch(path).await
    }

    /// Cache-first fetch.
    pub async fn fetch(&self, request: &str) -> Result<(Asset, FetchSource), AssetError> {
        if self.is_bypassed(request) {
            tracing::debug!(request, "asset cache bypassed");
            let asset = self.origin.fetch(request).await?;
            return Ok((asset, FetchSource::Bypass));
        }

        let key = cache_key(request);
        let cached = self
            .caches
            .read()
            .get(&self.name)
            .and_then(|cache| cache.get(&key))
            .cloned();
        if let Some(asset) = cached {
            return Ok((asset, FetchSource::Cache));
        }

        let asset = self.origin.fetch(request).await?;
        Ok((asset, FetchSource::Network))
    }

    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn cached_len(&self) -> usize {
        self.caches.read().get(&self.name).map_or(0, |cache| cache.len())
    }

    fn is_bypassed(&self, request: &str) -> bool {
        let Ok(url) = Url::parse(request) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };
        host_matches(host, &self.bypass_hosts)
    }
}

/// Relative requests are keyed without their leading slash; the root stays `/`.
fn cache_key(request: &str) -> String {
    if Url::parse(request).is_ok() {
        return request.to_string();
    }
    match request.trim_start_matches('/') {
        "" => "/".to_string(),
        path => path.to_string(),
    }
}
