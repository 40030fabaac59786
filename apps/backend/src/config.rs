//! Server configuration from the environment

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use game_session::SessionConfig;

/// Runtime configuration of the backend
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub stories_dir: PathBuf,
    pub asset_root: PathBuf,
    pub pexels_api_key: Option<String>,
    pub session: SessionConfig,
    /// Sessions not polled for this long are closed and saved
    pub session_idle: Duration,
}

impl ServerConfig {
    /// Read configuration from environment variables (and `.env` if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = match var("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {}", port))?,
            None => 3000,
        };

        let mut session = SessionConfig::default();
        if let Some(seconds) = var("QUIZ_SECONDS") {
            session.quiz_seconds = seconds
                .parse()
                .with_context(|| format!("QUIZ_SECONDS is not a number: {}", seconds))?;
        }

        let session_idle = match var("SESSION_IDLE_SECS") {
            Some(seconds) => Duration::from_secs(
                seconds
                    .parse()
                    .with_context(|| format!("SESSION_IDLE_SECS is not a number: {}", seconds))?,
            ),
            None => Duration::from_secs(30 * 60),
        };

        Ok(Self {
            database_url,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            stories_dir: var("STORIES_DIR").unwrap_or_else(|| "./stories".to_string()).into(),
            asset_root: var("ASSET_ROOT").unwrap_or_else(|| "./public".to_string()).into(),
            pexels_api_key: var("PEXELS_API_KEY"),
            session,
            session_idle,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
