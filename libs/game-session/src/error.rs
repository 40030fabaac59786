//! Error types for game-session.

use story_core::GameKind;
use thiserror::Error;

/// Errors raised while starting a session.
///
/// Running sessions never fail; late callbacks and bad input are ignored.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("game {game_id} is a {found} game, expected {expected}")]
    ContentMismatch {
        game_id: String,
        expected: GameKind,
        found: GameKind,
    },
}

/// Errors an image lookup may report. Sessions replace them with a placeholder.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Lookup service error: {status}")]
    Status { status: u16 },

    #[error("Decode error: {0}")]
    Decode(String),
}
