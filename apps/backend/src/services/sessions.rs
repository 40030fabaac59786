//! Live game sessions driven over HTTP.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use game_session::{
    start_session, GameEvent, GameHost, GameSession, ImageLookup, SessionConfig, SessionDeps,
};
use parking_lot::{Mutex, RwLock};
use story_core::{ProgressReport, SoundKind, Story};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::SessionResponse;
use crate::services::progress::ProgressWriter;

/// Host side of one HTTP-driven session.
///
/// Sounds are queued until the client polls; progress goes to the writer;
/// closing removes the session from the registry.
pub struct ServerHost {
    session_id: Uuid,
    sounds: Mutex<Vec<SoundKind>>,
    progress: ProgressWriter,
    registry: Weak<SessionRegistry>,
    last_seen: Mutex<Instant>,
}

impl ServerHost {
    fn take_sounds(&self) -> Vec<SoundKind> {
        std::mem::take(&mut *self.sounds.lock())
    }

    fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_seen.lock())
    }
}

impl GameHost for ServerHost {
    fn play_sound(&self, sound: SoundKind) {
        self.sounds.lock().push(sound);
    }

    fn save_progress(&self, report: &ProgressReport) {
        self.progress.submit(report.clone());
    }

    fn on_close(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.forget(self.session_id);
        }
    }
}

#[derive(Clone)]
struct LiveSession {
    session: Arc<dyn GameSession>,
    host: Arc<ServerHost>,
}

impl LiveSession {
    fn response(&self, session_id: Uuid) -> SessionResponse {
        SessionResponse {
            session_id,
            view: self.session.view(),
            sounds: self.host.take_sounds(),
        }
    }
}

/// All sessions currently being played, keyed by session id.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, LiveSession>>,
    progress: ProgressWriter,
    images: Arc<dyn ImageLookup>,
    config: SessionConfig,
    me: Weak<SessionRegistry>,
}

impl SessionRegistry {
    pub fn new(progress: ProgressWriter, images: Arc<dyn ImageLookup>, config: SessionConfig) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            sessions: RwLock::new(HashMap::new()),
            progress,
            images,
            config,
            me: me.clone(),
        })
    }

    /// Start a fresh session for one game of a story.
    pub fn start(&self, story: &Story, game_id: &str) -> Result<SessionResponse> {
        let game = story
            .game(game_id)
            .ok_or_else(|| ApiError::NotFound(format!("game {} in story {}", game_id, story.id)))?;

        let session_id = Uuid::new_v4();
        let host = Arc::new(ServerHost {
            session_id,
            sounds: Mutex::new(Vec::new()),
            progress: self.progress.clone(),
            registry: self.me.clone(),
            last_seen: Mutex::new(Instant::now()),
        });
        let deps = SessionDeps::new(host.clone(), self.images.clone());
        let session = start_session(
            game,
            &story.id,
            Arc::new(story.glossary.clone()),
            deps,
            &self.config,
        )?;

        let live = LiveSession { session, host };
        self.sessions.write().insert(session_id, live.clone());
        tracing::info!(%session_id, story = %story.id, game = %game_id, "session registered");
        Ok(live.response(session_id))
    }

    fn live(&self, session_id: Uuid) -> Option<LiveSession> {
        self.sessions.read().get(&session_id).cloned()
    }

    /// Current view and queued sounds of a session.
    pub fn snapshot(&self, session_id: Uuid) -> Option<SessionResponse> {
        let live = self.live(session_id)?;
        live.host.touch();
        Some(live.response(session_id))
    }

    /// Feed one event to a session.
    pub fn dispatch(&self, session_id: Uuid, event: GameEvent) -> Option<SessionResponse> {
        let live = self.live(session_id)?;
        live.host.touch();
        live.session.dispatch(event);
        Some(live.response(session_id))
    }

    /// Close a session. Returns false when it was not live.
    pub fn close(&self, session_id: Uuid, save: bool) -> bool {
        match self.live(session_id) {
            Some(live) => {
                live.session.close(save);
                true
            }
            None => false,
        }
    }

    /// Close every live session, e.g. on shutdown.
    pub fn close_all(&self, save: bool) {
        let live: Vec<LiveSession> = self.sessions.read().values().cloned().collect();
        for entry in live {
            entry.session.close(save);
        }
    }

    /// Close, with saving, every session not polled for at least `idle`.
    /// Returns how many were closed.
    pub fn sweep_idle(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let stale: Vec<(Uuid, LiveSession)> = self
            .sessions
            .read()
            .iter()
            .filter(|(_, live)| live.host.idle_for(now) >= idle)
            .map(|(id, live)| (*id, live.clone()))
            .collect();
        for (session_id, live) in &stale {
            tracing::info!(%session_id, "closing idle session");
            live.session.close(true);
        }
        stale.len()
    }

    /// Periodically close sessions idle for longer than `idle`.
    ///
    /// The task stops once the registry is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, idle: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        let period = (idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let closed = registry.sweep_idle(idle);
                if closed > 0 {
                    tracing::debug!(closed, live = registry.len(), "idle sweep");
                }
            }
        })
    }

    fn forget(&self, session_id: Uuid) {
        if self.sessions.write().remove(&session_id).is_some() {
            tracing::debug!(%session_id, "session removed");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
