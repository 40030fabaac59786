//! Game session state machines for the interactive stories.
//!
//! Provides:
//! - The session contract shared by every game (lifecycle, scoring, close)
//! - Timed quiz with a countdown racing the player's answer
//! - Memory cards with concurrent image lookups and a locked two-card protocol
//! - Sentence ordering and fill-the-blank spelling
//! - Host capabilities (sounds, progress, close notification, rendering)

pub mod blanks;
pub mod config;
pub mod contract;
mod engine;
pub mod error;
pub mod host;
pub mod memory;
pub mod quiz;
#[cfg(any(test, feature = "test-support"))]
pub mod recording;
pub mod sentence;
mod timer;
pub mod view;

use std::sync::Arc;

use story_core::{GameDescriptor, GameKind, Glossary};

pub use blanks::BlanksSession;
pub use config::SessionConfig;
pub use contract::{GameEvent, GameSession, Phase, SessionContext, Tally};
pub use error::{LookupError, SessionError};
pub use host::{placeholder_image, GameHost, ImageLookup, NoImages, SessionDeps};
pub use memory::MemorySession;
pub use quiz::QuizSession;
#[cfg(any(test, feature = "test-support"))]
pub use recording::{RecordingHost, ScriptedImages};
pub use sentence::SentenceSession;
pub use view::*;

/// Start the session matching a game's content.
pub fn start_session(
    descriptor: &GameDescriptor,
    story_id: &str,
    glossary: Arc<Glossary>,
    deps: SessionDeps,
    config: &SessionConfig,
) -> Result<Arc<dyn GameSession>, SessionError> {
    let SessionDeps { host, images } = deps;
    let session: Arc<dyn GameSession> = match descriptor.kind() {
        GameKind::Sentences => SentenceSession::start(descriptor, story_id, glossary, host, config)?,
        GameKind::Quiz => QuizSession::start(descriptor, story_id, host, config)?,
        GameKind::Memory => MemorySession::start(descriptor, story_id, host, images, config)?,
        GameKind::Blanks => BlanksSession::start(descriptor, story_id, host, config)?,
    };
    Ok(session)
}
