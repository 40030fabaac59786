use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seconds a quiz question may stay unanswered.
pub const QUIZ_SECONDS: u32 = 15;

/// Remaining seconds below which the quiz timer turns to warning.
pub const WARNING_BELOW: u32 = 10;

/// Remaining seconds below which the quiz timer turns critical.
pub const CRITICAL_BELOW: u32 = 5;

/// Delay before a matched memory pair settles.
pub const MATCH_SETTLE_MS: u64 = 500;

/// How long a mismatched memory pair stays visible.
pub const MISMATCH_REVEAL_MS: u64 = 1200;

/// Shake animation of a mismatched pair before it flips back.
pub const MISMATCH_SHAKE_MS: u64 = 600;

/// Pause between the last memory match and the completion screen.
pub const COMPLETION_DELAY_MS: u64 = 800;

/// Lifetime of the "try again" message in the sentence game.
pub const SENTENCE_FEEDBACK_MS: u64 = 2000;

/// Lifetime of the "try again" message in the fill-the-blanks game.
pub const BLANKS_FEEDBACK_MS: u64 = 2500;

/// Timing and randomness of game sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub quiz_seconds: u32,
    pub match_settle_ms: u64,
    pub mismatch_reveal_ms: u64,
    pub mismatch_shake_ms: u64,
    pub completion_delay_ms: u64,
    pub sentence_feedback_ms: u64,
    pub blanks_feedback_ms: u64,
    /// Fixed shuffle seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quiz_seconds: QUIZ_SECONDS,
            match_settle_ms: MATCH_SETTLE_MS,
            mismatch_reveal_ms: MISMATCH_REVEAL_MS,
            mismatch_shake_ms: MISMATCH_SHAKE_MS,
            completion_delay_ms: COMPLETION_DELAY_MS,
            sentence_feedback_ms: SENTENCE_FEEDBACK_MS,
            blanks_feedback_ms: BLANKS_FEEDBACK_MS,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Default timings with a fixed shuffle seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub(crate) fn match_settle(&self) -> Duration {
        Duration::from_millis(self.match_settle_ms)
    }

    pub(crate) fn mismatch_reveal(&self) -> Duration {
        Duration::from_millis(self.mismatch_reveal_ms)
    }

    pub(crate) fn mismatch_shake(&self) -> Duration {
        Duration::from_millis(self.mismatch_shake_ms)
    }

    pub(crate) fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    pub(crate) fn sentence_feedback(&self) -> Duration {
        Duration::from_millis(self.sentence_feedback_ms)
    }

    pub(crate) fn blanks_feedback(&self) -> Duration {
        Duration::from_millis(self.blanks_feedback_ms)
    }
}
