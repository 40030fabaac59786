//! Capabilities a host application lends to every session.

use async_trait::async_trait;
use std::fmt::Write;
use std::sync::Arc;
use story_core::{ProgressReport, SoundKind};

use crate::error::LookupError;
use crate::view::GameView;

/// Host callbacks. All of them are fire-and-forget.
///
/// Sessions never call these while holding their own lock, so a host may
/// call back into the session (for example to read its view).
pub trait GameHost: Send + Sync {
    fn play_sound(&self, sound: SoundKind);

    /// Called at most once per completion or saving close.
    fn save_progress(&self, report: &ProgressReport);

    /// Called exactly once when the session is torn down.
    fn on_close(&self);

    /// Latest declarative view after every state change.
    fn render(&self, _view: &GameView) {}
}

/// Illustration lookup for memory cards.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Resolve an image URL for a vocabulary term. `Ok(None)` when nothing matches.
    async fn lookup(&self, term: &str) -> Result<Option<String>, LookupError>;
}

/// Lookup that never finds anything; every card gets its placeholder.
pub struct NoImages;

#[async_trait]
impl ImageLookup for NoImages {
    async fn lookup(&self, _term: &str) -> Result<Option<String>, LookupError> {
        Ok(None)
    }
}

/// Collaborators handed to a session when it starts.
#[derive(Clone)]
pub struct SessionDeps {
    pub host: Arc<dyn GameHost>,
    pub images: Arc<dyn ImageLookup>,
}

impl SessionDeps {
    pub fn new(host: Arc<dyn GameHost>, images: Arc<dyn ImageLookup>) -> Self {
        Self { host, images }
    }

    /// Dependencies for games that never look up images.
    pub fn without_images(host: Arc<dyn GameHost>) -> Self {
        Self {
            host,
            images: Arc::new(NoImages),
        }
    }
}

/// Deterministic placeholder illustration for a term.
pub fn placeholder_image(term: &str) -> String {
    let mut url = String::from("https://placehold.co/400x400/374151/FFFFFF?text=");
    for byte in term.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            url.push(byte as char);
        } else {
            let _ = write!(url, "%{:02X}", byte);
        }
    }
    url
}

/// One side effect requested by a session.
#[derive(Debug, Clone)]
pub(crate) enum Effect {
    Sound(SoundKind),
    Save(ProgressReport),
    Render(GameView),
    Closed,
}

/// Effects collected under the session lock and delivered after it is released.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    effects: Vec<Effect>,
}

impl Outbox {
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn flush(self, host: &dyn GameHost) {
        for effect in self.effects {
            match effect {
                Effect::Sound(sound) => host.play_sound(sound),
                Effect::Save(report) => host.save_progress(&report),
                Effect::Render(view) => host.render(&view),
                Effect::Closed => host.on_close(),
            }
        }
    }
}
